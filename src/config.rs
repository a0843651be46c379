use std::fs;

use anyhow::{Context, Result, anyhow};
use eframe::egui::{Color32, Vec2, vec2};
use serde::Deserialize;

use crate::util::parse_hex_color;

/// One knowledge-domain cluster of the force graph. Immutable after load.
#[derive(Clone, Debug, Deserialize)]
pub struct ClusterSpec {
    pub id: String,
    pub label: String,
    pub color: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub concepts: Vec<String>,
}

impl ClusterSpec {
    pub fn center(&self) -> Vec2 {
        vec2(self.x, self.y)
    }

    pub fn color32(&self) -> Color32 {
        parse_hex_color(&self.color).unwrap_or(Color32::from_gray(140))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PresentationConfig {
    #[serde(default)]
    pub clusters: Vec<ClusterSpec>,
}

impl PresentationConfig {
    pub fn entity_total(&self) -> usize {
        self.clusters.iter().map(|cluster| cluster.count).sum()
    }
}

pub fn load_presentation_config(path: &str) -> Result<PresentationConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read presentation data from {path}"))?;
    parse_presentation_config(&raw).with_context(|| format!("failed to parse {path}"))
}

pub fn parse_presentation_config(raw: &str) -> Result<PresentationConfig> {
    let config: PresentationConfig =
        serde_json::from_str(raw).context("invalid presentation JSON")?;

    for cluster in &config.clusters {
        if cluster.id.is_empty() {
            return Err(anyhow!("cluster with empty id in presentation data"));
        }
    }

    Ok(config)
}
