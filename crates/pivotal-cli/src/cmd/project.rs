use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use pivotal_core::{Client, Project};
use std::io::{BufRead, Write};

pub fn list(client: &Client, json: bool) -> anyhow::Result<()> {
    let projects = Project::all(client).context("failed to list projects")?;

    if json {
        print_json(&projects)?;
    } else if projects.is_empty() {
        println!("No projects.");
    } else {
        let rows = projects
            .iter()
            .enumerate()
            .map(|(i, p)| {
                vec![
                    (i + 1).to_string(),
                    p.project_id.clone(),
                    p.name.clone(),
                    p.point_scale.join(","),
                ]
            })
            .collect();
        print_table(&["INDEX", "ID", "NAME", "POINTS"], rows);
    }
    Ok(())
}

/// Choose the project to work on.
///
/// The zero-based `index` wins when given, and must name a listed project.
/// Otherwise a lone project is used as is, and with several the user is
/// asked on stdin.
pub fn pick(client: &Client, index: Option<usize>) -> anyhow::Result<Project> {
    let mut projects = Project::all(client).context("failed to list projects")?;

    if projects.is_empty() {
        bail!("no projects are visible to this token");
    }
    if let Some(i) = index {
        let count = projects.len();
        return projects
            .into_iter()
            .nth(i)
            .with_context(|| format!("no project at index {} ({count} available)", i + 1));
    }
    if projects.len() == 1 {
        return Ok(projects.remove(0));
    }

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    loop {
        println!("Select a Project:");
        for (i, project) in projects.iter().enumerate() {
            println!("[{}] {}", i + 1, project.name);
        }
        print!(">> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("no project selected");
        }
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=projects.len()).contains(&n) => return Ok(projects.remove(n - 1)),
            _ => println!("Hmmm, that did not work -- try again?"),
        }
    }
}
