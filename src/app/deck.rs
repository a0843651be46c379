//! The narrative deck: ordered sections and steps, plus the scroll tracker
//! that turns a scroll offset into step-crossing events.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum SectionKind {
    ForceGraph,
    MarketSizing,
    Causal,
    Workflow,
}

impl SectionKind {
    pub(super) fn title(self) -> &'static str {
        match self {
            Self::ForceGraph => "Activating Knowledge",
            Self::MarketSizing => "Market Sizing with Fermi Estimation",
            Self::Causal => "Causal Reasoning",
            Self::Workflow => "The Deep Research Workflow",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Step {
    pub id: &'static str,
    pub section: SectionKind,
    pub title: &'static str,
    pub body: &'static str,
}

pub(super) const STEPS: &[Step] = &[
    Step {
        id: "intro",
        section: SectionKind::ForceGraph,
        title: "A Map of What the Model Knows",
        body: "Each point is a concept; each cluster is a knowledge domain. \
               Watch what different prompts light up.",
    },
    Step {
        id: "simple-prompt",
        section: SectionKind::ForceGraph,
        title: "The Simple Prompt",
        body: "A one-line question reaches a single cluster. The answer can \
               only draw on what lives there.",
    },
    Step {
        id: "structured-prompt",
        section: SectionKind::ForceGraph,
        title: "The Structured Prompt",
        body: "Role, context, constraints and format activate domain after \
               domain, and the connections between them start to carry weight.",
    },
    Step {
        id: "key-insight",
        section: SectionKind::ForceGraph,
        title: "The Key Insight",
        body: "Structure is not decoration. The inter-cluster relationships \
               are where the useful answers come from.",
    },
    Step {
        id: "transition",
        section: SectionKind::ForceGraph,
        title: "From Picture to Practice",
        body: "Let's apply this to a real estimation problem.",
    },
    Step {
        id: "search-style",
        section: SectionKind::MarketSizing,
        title: "The Search-Style Approach",
        body: "\"What's the market size for a weight loss AI chatbot in the \
               US?\" Generic numbers, no path to validate them.",
    },
    Step {
        id: "structured-query",
        section: SectionKind::MarketSizing,
        title: "The Structured Query",
        body: "Role: market sizing analyst using Fermi estimation. Context, \
               product, audience, and the decision the number feeds.",
    },
    Step {
        id: "decomposition",
        section: SectionKind::MarketSizing,
        title: "Fermi Decomposition",
        body: "From 260M US adults down to a serviceable market, one defensible \
               ratio at a time.",
    },
    Step {
        id: "bounds",
        section: SectionKind::MarketSizing,
        title: "Bounding the Answer",
        body: "Pessimistic and optimistic scenarios bracket the central \
               estimate, and sensitivity shows which assumptions matter.",
    },
    Step {
        id: "data-pattern",
        section: SectionKind::Causal,
        title: "A Suspicious Pattern",
        body: "Completion rates differ wildly across condition pages and flow \
               lengths. The obvious story is probably wrong.",
    },
    Step {
        id: "causal-model",
        section: SectionKind::Causal,
        title: "Drawing the Causal Model",
        body: "Condition drives content, intent and flow length all at once. \
               Correlation between flow and completion is confounded.",
    },
    Step {
        id: "experiment-roadmap",
        section: SectionKind::Causal,
        title: "An Experiment Roadmap",
        body: "Randomize flow length within condition to isolate the effect \
               the data alone cannot give you.",
    },
    Step {
        id: "workflow-intro",
        section: SectionKind::Workflow,
        title: "The Research Cycle",
        body: "Skills structure the thinking, synthesis shapes the prompt, \
               deep research feeds the next round of skills.",
    },
    Step {
        id: "custom-prompt",
        section: SectionKind::Workflow,
        title: "Synthesizing a Custom Prompt",
        body: "Ground the research request in the work you just did, the \
               audience you serve and the decision at hand.",
    },
    Step {
        id: "closing",
        section: SectionKind::Workflow,
        title: "Closing the Loop",
        body: "Each pass through the cycle leaves you with sharper structure \
               for the next question.",
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Direction {
    Up,
    Down,
}

/// Maps the narrative panel's scroll offset onto the step whose card sits
/// under the trigger line (half the viewport down), and reports crossings.
pub(super) struct StepTracker {
    current: Option<usize>,
}

impl StepTracker {
    pub(super) fn new() -> Self {
        Self { current: None }
    }

    pub(super) fn current(&self) -> Option<usize> {
        self.current
    }

    pub(super) fn observe(
        &mut self,
        scroll_offset: f32,
        viewport_height: f32,
        card_height: f32,
        step_count: usize,
    ) -> Option<(usize, Direction)> {
        if step_count == 0 || card_height <= 0.0 {
            return None;
        }

        let trigger = scroll_offset + viewport_height * 0.5;
        let index = ((trigger / card_height).floor().max(0.0) as usize).min(step_count - 1);

        match self.current {
            Some(previous) if previous == index => None,
            previous => {
                self.current = Some(index);
                let direction = match previous {
                    Some(previous) if index < previous => Direction::Up,
                    _ => Direction::Down,
                };
                Some((index, direction))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_ids_are_unique() {
        let mut ids: Vec<&str> = STEPS.iter().map(|step| step.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), STEPS.len());
    }

    #[test]
    fn sections_appear_in_contiguous_runs() {
        let mut seen = Vec::new();
        for step in STEPS {
            if seen.last() != Some(&step.section) {
                assert!(!seen.contains(&step.section));
                seen.push(step.section);
            }
        }
    }

    #[test]
    fn first_observation_lands_on_the_first_step() {
        let mut tracker = StepTracker::new();
        let event = tracker.observe(0.0, 800.0, 700.0, STEPS.len());
        assert_eq!(event, Some((0, Direction::Down)));
    }

    #[test]
    fn crossings_fire_once_per_boundary() {
        let mut tracker = StepTracker::new();
        assert!(tracker.observe(0.0, 800.0, 700.0, 5).is_some());

        // Scrolling within the same card is quiet.
        assert_eq!(tracker.observe(100.0, 800.0, 700.0, 5), None);
        assert_eq!(tracker.observe(250.0, 800.0, 700.0, 5), None);

        // Crossing into the next card fires exactly once.
        assert_eq!(tracker.observe(320.0, 800.0, 700.0, 5), Some((1, Direction::Down)));
        assert_eq!(tracker.observe(330.0, 800.0, 700.0, 5), None);
    }

    #[test]
    fn scrolling_back_reports_up() {
        let mut tracker = StepTracker::new();
        tracker.observe(0.0, 800.0, 700.0, 5);
        tracker.observe(1500.0, 800.0, 700.0, 5);
        let event = tracker.observe(200.0, 800.0, 700.0, 5);
        assert_eq!(event, Some((0, Direction::Up)));
    }

    #[test]
    fn index_clamps_to_the_last_step() {
        let mut tracker = StepTracker::new();
        let event = tracker.observe(100_000.0, 800.0, 700.0, 5);
        assert_eq!(event, Some((4, Direction::Down)));
    }

    #[test]
    fn empty_deck_is_quiet() {
        let mut tracker = StepTracker::new();
        assert_eq!(tracker.observe(0.0, 800.0, 700.0, 0), None);
        assert_eq!(tracker.observe(0.0, 800.0, 0.0, 5), None);
    }
}
