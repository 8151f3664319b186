use crate::output::{heading, print_json, title_case};
use anyhow::Context;
use chrono::Local;
use pivotal_core::report::{estimate_bar, initials, Changelog, Scrum};
use pivotal_core::{Client, Story};

pub fn changelog(client: &Client, index: Option<usize>, json: bool) -> anyhow::Result<()> {
    let project = super::project::pick(client, index)?;
    let changelog =
        Changelog::build(client, &project).context("failed to load changelog stories")?;

    if json {
        return print_json(&changelog);
    }

    println!();
    println!("{}", heading(&format!("Change Log {}", changelog.project)));
    println!();
    println!("{}", heading("New Features"));
    for group in &changelog.new_features {
        println!("{}", title_case(&group.key));
        for story in &group.stories {
            println!("    * {:<14} {}", format!("[{}]", story.story_id), story.name);
        }
    }

    println!();
    println!("{}", heading("Bugs Fixed"));
    print_labeled(&changelog.bugs_fixed);

    println!();
    println!("{}", heading("Known Issues"));
    print_labeled(&changelog.known_issues);
    println!();
    Ok(())
}

fn print_labeled(stories: &[Story]) {
    if stories.is_empty() {
        println!("None");
        println!();
        return;
    }
    for story in stories {
        println!("{}", labeled_line(story));
    }
}

fn labeled_line(story: &Story) -> String {
    let mut text = String::new();
    if !story.labels.is_empty() {
        text.push_str(&format!("[{}] ", story.labels));
    }
    text.push_str(&story.name);
    format!("* {:<14} {}", format!("[{}]", story.story_id), text)
}

pub fn scrum(client: &Client, index: Option<usize>, json: bool) -> anyhow::Result<()> {
    let project = super::project::pick(client, index)?;
    let scrum = Scrum::build(client, &project).context("failed to load scrum stories")?;

    if json {
        return print_json(&scrum);
    }

    println!(
        "{} SCRUM -- {}",
        scrum.project,
        Local::now().format("%b %d, %Y")
    );
    println!();

    for group in &scrum.by_owner {
        println!("{}", group.key);
        for story in &group.stories {
            println!(
                "   #{:<12}{:<9} {:<7} {}",
                story.story_id,
                estimate_bar(story.estimate),
                story.story_type,
                story.name
            );
        }
        println!();
    }

    println!("Bugs");
    if scrum.bugs.is_empty() {
        println!("Not sure that I believe it, but there are no bugs");
    }
    for bug in &scrum.bugs {
        println!(
            "   #{:<12} {:<4} {}",
            bug.story_id,
            initials(&bug.owned_by),
            bug.name
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_line_prefixes_labels() {
        let mut story = Story::from_document(
            "<story><id>7</id><name>Broken login</name><labels>auth,web</labels></story>",
        )
        .unwrap();
        assert_eq!(
            labeled_line(&story),
            "* [7]            [auth,web] Broken login"
        );
        story.labels.clear();
        assert_eq!(labeled_line(&story), "* [7]            Broken login");
    }
}
