//! Unit tests for CLI commands

use std::sync::Arc;

use clap::Parser;

use super::commands::execute;
use crate::cli::{Cli, Commands};
use crate::controller::InvokeError;
use crate::declaration::{ControllerDeclaration, HttpMethod, RouteDeclaration};
use crate::message::Response;
use crate::registry::Registry;
use crate::Controller;

#[derive(Default)]
struct Status;

impl Controller for Status {
    fn declaration() -> ControllerDeclaration {
        ControllerDeclaration::new("app::status::Status", "status")
            .with_route(RouteDeclaration::new(HttpMethod::Get, "", "index"))
            .with_route(
                RouteDeclaration::new(HttpMethod::Get, "{part}", "part").with_params(["part"]),
            )
    }

    fn invoke(&mut self, method: &str, _args: Vec<String>) -> Result<Response, InvokeError> {
        Err(InvokeError::UnknownMethod {
            method: method.to_string(),
        })
    }
}

fn run(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut registry = Registry::new();
    registry.register_controller::<Status>();
    let mut out = Vec::new();
    execute(&cli, Arc::new(registry), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn workspace() -> (tempfile::TempDir, String, String) {
    let dir = tempfile::tempdir().unwrap();
    let controllers = dir.path().join("controllers");
    std::fs::create_dir(&controllers).unwrap();
    std::fs::write(controllers.join("status.rs"), "pub struct Status;").unwrap();
    std::fs::write(controllers.join("helper.rs"), "pub struct Helper;").unwrap();
    let cache = dir.path().join("cache").display().to_string();
    (dir, cache, controllers.display().to_string())
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["routeforge", "build"],
        vec!["routeforge", "scan", "--all"],
        vec!["routeforge", "inspect", "--cache-dir", "c"],
        vec!["routeforge", "match", "GET", "/x"],
        vec!["routeforge", "--controller-dir", "src/c", "watch"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

#[test]
fn test_match_arguments() {
    let cli = Cli::try_parse_from(["routeforge", "match", "post", "/a/b"]).unwrap();
    match cli.command {
        Commands::Match { method, path } => {
            assert_eq!(method, "post");
            assert_eq!(path, "/a/b");
        }
        _ => panic!("Expected Match command"),
    }
}

#[test]
fn test_scan_lists_controllers_only() {
    let (_dir, cache, controllers) = workspace();
    let args = [
        "routeforge",
        "--cache-dir",
        cache.as_str(),
        "--controller-dir",
        controllers.as_str(),
    ];

    let out = run(&[&args[..], &["scan"][..]].concat());
    assert_eq!(out, "status::Status\n");

    let out = run(&[&args[..], &["scan", "--all"][..]].concat());
    assert_eq!(out, "helper::Helper\nstatus::Status\n");
}

#[test]
fn test_build_inspect_and_match() {
    let (_dir, cache, controllers) = workspace();
    let args = [
        "routeforge",
        "--cache-dir",
        cache.as_str(),
        "--controller-dir",
        controllers.as_str(),
    ];

    let out = run(&[&args[..], &["build"][..]].concat());
    assert!(out.starts_with("built 2 route(s)"), "{out}");

    let out = run(&[&args[..], &["inspect"][..]].concat());
    assert_eq!(out.lines().count(), 2);
    assert!(out.contains("/status/{part}"));

    let out = run(&[&args[..], &["match", "get", "/status/disk"][..]].concat());
    assert!(out.starts_with("matched GET"), "{out}");
    assert!(out.contains("part = disk"));

    let out = run(&[&args[..], &["match", "DELETE", "/status"][..]].concat());
    assert_eq!(out, "method not allowed; Allow: GET\n");

    let out = run(&[&args[..], &["match", "GET", "/nope"][..]].concat());
    assert_eq!(out, "not found\n");
}
