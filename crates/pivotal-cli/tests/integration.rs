#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use tempfile::TempDir;

const PROJECTS: &str = r#"<projects type="array">
  <project><id>11</id><name>Website</name><point_scale>0,1,2,3</point_scale></project>
  <project><id>12</id><name>Mobile</name><point_scale>0,1,2,3,5,8</point_scale></project>
</projects>"#;

const UNESTIMATED: &str = r#"<story>
  <id>42</id><project_id>12</project_id><story_type>feature</story_type>
  <current_state>unstarted</current_state><name>Dark mode</name>
</story>"#;

const DELIVERED: &str = r#"<story>
  <id>43</id><project_id>12</project_id><story_type>feature</story_type>
  <current_state>delivered</current_state><estimate>2</estimate><name>Offline sync</name>
  <owned_by>Ann Lee</owned_by>
</story>"#;

/// Isolated HOME so no `~/.pivotal.yaml` leaks into the run.
fn pivotal(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pivotal").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("PIVOTAL_TOKEN")
        .env_remove("PIVOTAL_BASE_URL")
        .env_remove("PIVOTAL_PROJECT_INDEX")
        .env_remove("PIVOTAL_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

fn against(home: &TempDir, server: &Server) -> Command {
    let mut cmd = pivotal(home);
    cmd.env("PIVOTAL_TOKEN", "t0ken")
        .env("PIVOTAL_BASE_URL", server.url());
    cmd
}

fn mock_projects(server: &mut Server) -> mockito::Mock {
    server
        .mock("GET", "/projects")
        .match_header("X-TrackerToken", "t0ken")
        .with_status(200)
        .with_body(PROJECTS)
        .create()
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

#[test]
fn missing_token_is_reported_before_any_request() {
    let home = TempDir::new().unwrap();
    pivotal(&home)
        .arg("projects")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PIVOTAL_TOKEN"));
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    pivotal(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("changelog"))
        .stdout(predicate::str::contains("poker"));
}

#[test]
fn project_index_is_one_based() {
    let home = TempDir::new().unwrap();
    pivotal(&home)
        .args(["--project-index", "0", "scrum"])
        .env("PIVOTAL_TOKEN", "t0ken")
        .assert()
        .failure();
}

#[test]
fn token_can_come_from_home_config() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/projects")
        .match_header("X-TrackerToken", "from-file")
        .with_status(200)
        .with_body(PROJECTS)
        .create();
    std::fs::write(
        home.path().join(".pivotal.yaml"),
        format!("token: from-file\nbase_url: {}\n", server.url()),
    )
    .unwrap();

    pivotal(&home)
        .arg("projects")
        .assert()
        .success()
        .stdout(predicate::str::contains("Website"));
    mock.assert();
}

#[test]
fn rust_log_enables_debug_output() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    mock_projects(&mut server);

    against(&home, &server)
        .env("RUST_LOG", "debug")
        .arg("projects")
        .assert()
        .success()
        .stderr(predicate::str::contains("sending request"));
}

#[test]
fn debug_output_is_off_by_default() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    mock_projects(&mut server);

    against(&home, &server)
        .arg("projects")
        .assert()
        .success()
        .stderr(predicate::str::contains("sending request").not());
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[test]
fn projects_table() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    let mock = mock_projects(&mut server);

    against(&home, &server)
        .arg("projects")
        .assert()
        .success()
        .stdout(predicate::str::contains("Website"))
        .stdout(predicate::str::contains("0,1,2,3,5,8"));
    mock.assert();
}

#[test]
fn stories_uses_the_project_index() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    mock_projects(&mut server);
    let stories = server
        .mock("GET", "/projects/12/stories")
        .match_query(Matcher::UrlEncoded(
            "filter".into(),
            "state:unscheduled,unstarted,rejected,started owner:AL".into(),
        ))
        .with_status(200)
        .with_body(format!(r#"<stories type="array">{DELIVERED}</stories>"#))
        .create();

    against(&home, &server)
        .args(["--project-index", "2", "stories", "--for", "AL", "--number", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#43"))
        .stdout(predicate::str::contains("AL"))
        .stdout(predicate::str::contains("Offline sync"));
    stories.assert();
}

#[test]
fn changelog_json() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    mock_projects(&mut server);
    let features = server
        .mock("GET", "/projects/11/stories")
        .match_query(Matcher::UrlEncoded(
            "filter".into(),
            "state:delivered,finished type:feature".into(),
        ))
        .with_status(200)
        .with_body(format!(r#"<stories type="array">{DELIVERED}</stories>"#))
        .create();
    server
        .mock("GET", "/projects/11/stories")
        .match_query(Matcher::Regex("type%3Abug|type:bug".into()))
        .with_status(200)
        .with_body(r#"<stories type="array"></stories>"#)
        .create();

    let output = against(&home, &server)
        .args(["--project-index", "1", "--json", "changelog"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["project"], "Website");
    assert_eq!(value["new_features"][0]["key"], "Other");
    assert_eq!(value["new_features"][0]["stories"][0]["story_id"], "43");
    features.assert();
}

// ---------------------------------------------------------------------------
// Story actions
// ---------------------------------------------------------------------------

#[test]
fn unestimated_story_cannot_start() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    mock_projects(&mut server);
    server
        .mock("GET", "/projects/12/stories/42")
        .with_status(200)
        .with_body(UNESTIMATED)
        .create();
    let put = server
        .mock("PUT", Matcher::Any)
        .with_status(200)
        .expect(0)
        .create();

    against(&home, &server)
        .args(["--project-index", "2", "start", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Story must be estimated"));
    put.assert();
}

#[test]
fn accept_scans_projects() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    mock_projects(&mut server);
    server
        .mock("GET", "/projects/11/stories/43")
        .with_status(404)
        .create();
    server
        .mock("GET", "/projects/12/stories/43")
        .with_status(200)
        .with_body(DELIVERED)
        .create();
    let put = server
        .mock("PUT", "/projects/12/stories/43")
        .match_query(Matcher::UrlEncoded(
            "story[current_state]".into(),
            "accepted".into(),
        ))
        .with_status(200)
        .with_body(DELIVERED)
        .create();

    against(&home, &server)
        .args(["accept", "43"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Story: [43] Offline sync is ACCEPTED"));
    put.assert();
}

#[test]
fn unknown_story_is_reported_without_failing() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    mock_projects(&mut server);
    server
        .mock("GET", Matcher::Regex("^/projects/1[12]/stories/999".into()))
        .with_status(404)
        .expect(2)
        .create();

    against(&home, &server)
        .args(["story", "999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Could not find story #999"));
}

#[test]
fn transition_of_unknown_story_sends_nothing() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    mock_projects(&mut server);
    server
        .mock("GET", "/projects/12/stories/999")
        .with_status(404)
        .create();
    let put = server
        .mock("PUT", Matcher::Any)
        .with_status(200)
        .expect(0)
        .create();

    against(&home, &server)
        .args(["--project-index", "2", "accept", "999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Could not find story #999"));
    put.assert();
}

#[test]
fn index_past_a_lone_project_fails() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    server
        .mock("GET", "/projects")
        .with_status(200)
        .with_body(
            r#"<projects type="array"><project><id>11</id><name>Website</name></project></projects>"#,
        )
        .create();

    against(&home, &server)
        .args(["--project-index", "5", "scrum"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no project at index 5"));
}

#[test]
fn create_posts_to_the_selected_project() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    mock_projects(&mut server);
    let post = server
        .mock("POST", "/projects/11/stories")
        .match_header("content-type", "application/xml")
        .match_body(Matcher::Exact(
            "<story><name>Fix footer</name><story_type>bug</story_type></story>".into(),
        ))
        .with_status(200)
        .with_body(
            "<story><id>77</id><story_type>bug</story_type><name>Fix footer</name></story>",
        )
        .create();

    against(&home, &server)
        .args(["--project-index", "1", "create", "bug", "Fix footer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created bug #77: Fix footer"));
    post.assert();
}

#[test]
fn rejected_mutation_fails() {
    let home = TempDir::new().unwrap();
    let mut server = Server::new();
    mock_projects(&mut server);
    server
        .mock("POST", "/projects/11/stories")
        .with_status(422)
        .with_body("<errors><error>Name can't be blank</error></errors>")
        .create();

    against(&home, &server)
        .args(["--project-index", "1", "create", "chore", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("422"));
}
