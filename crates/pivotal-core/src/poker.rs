//! Planning-poker answers, validated against the project's point scale.

use crate::project::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PokerAnswer {
    Estimate(u32),
    Skip,
    Open,
    Quit,
    Invalid,
}

impl PokerAnswer {
    pub fn parse(input: &str, project: &Project) -> Self {
        match input.trim() {
            "s" | "S" => PokerAnswer::Skip,
            "o" | "O" => PokerAnswer::Open,
            "q" | "Q" => PokerAnswer::Quit,
            other => project
                .point_scale_accepts(other)
                .map_or(PokerAnswer::Invalid, PokerAnswer::Estimate),
        }
    }
}

/// The prompt shown for each story, e.g. `[0,1,2,3, (s)kip, (o)pen, (q)uit]`.
pub fn prompt(project: &Project) -> String {
    format!(
        "[{}, (s)kip, (o)pen, (q)uit]",
        project.point_scale.join(",")
    )
}
