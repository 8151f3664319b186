use crate::output::{clear_screen, terminal_width};
use anyhow::Context;
use pivotal_core::poker::{self, PokerAnswer};
use pivotal_core::{Client, Project, Story};
use std::io::{BufRead, Write};

enum Outcome {
    Next,
    Quit,
}

pub fn run(client: &Client, index: Option<usize>) -> anyhow::Result<()> {
    let project = super::project::pick(client, index)?;
    let stories = project
        .unestimated_stories(client)
        .context("failed to load unestimated stories")?;
    let total = stories.len();

    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    for (i, story) in stories.iter().enumerate() {
        clear_screen();
        println!(
            "{} PLANNING POKER SESSION [{}/{} Stories Estimated]",
            project.name.to_uppercase(),
            i + 1,
            total
        );
        println!("{}", "-".repeat(terminal_width()));
        print_story(story);

        if let Outcome::Quit = estimate(client, &project, story, &mut input)? {
            return Ok(());
        }
    }

    println!("KaBoom!!! Nice Work Team");
    Ok(())
}

fn estimate(
    client: &Client,
    project: &Project,
    story: &Story,
    input: &mut impl BufRead,
) -> anyhow::Result<Outcome> {
    loop {
        println!();
        println!("Estimate: {}", poker::prompt(project));
        print!(">> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Outcome::Quit);
        }

        match PokerAnswer::parse(&line, project) {
            PokerAnswer::Skip => return Ok(Outcome::Next),
            PokerAnswer::Quit => return Ok(Outcome::Quit),
            PokerAnswer::Open => {
                if let Err(e) = open::that(&story.url) {
                    tracing::warn!(url = %story.url, error = %e, "could not open browser");
                }
            }
            PokerAnswer::Estimate(points) => {
                story
                    .assign_estimate(client, points)
                    .with_context(|| format!("failed to estimate story #{}", story.story_id))?;
                return Ok(Outcome::Next);
            }
            PokerAnswer::Invalid => println!("Invalid Input, Try again"),
        }
    }
}

fn print_story(story: &Story) {
    println!();
    println!("{}", story.name);
    if !story.description.is_empty() {
        println!();
        println!("{}", story.description);
        println!();
    }
    super::story::print_details(story);
    if !story.labels.is_empty() {
        println!();
        println!("Labels: {}", story.labels);
    }
}
