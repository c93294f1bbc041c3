use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::error::EditorError;
use crate::models::FormField;
use crate::services::api::ApiClient;
use crate::services::editor::ResourceListEditor;
use crate::view::render_dashboard;

const HELP: &str = "Commands:
  new                     start a new DPP
  edit <id>               load a DPP into the form
  set <field> <value>     set name, category or status
  cancel                  clear the form
  save                    create or update from the form
  delete <id>             delete a DPP
  reload                  re-read the collection
  help                    show this text
  quit                    leave the dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardInput {
    New,
    Edit(String),
    Set(FormField, String),
    Cancel,
    Save,
    Delete(String),
    Reload,
    Help,
    Quit,
}

pub fn parse_input(line: &str) -> Result<DashboardInput, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "new" | "add" => Ok(DashboardInput::New),
        "edit" => required_arg(rest, "edit <id>").map(DashboardInput::Edit),
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .map(|(field, value)| (field, value.trim()))
                .unwrap_or((rest, ""));
            if field.is_empty() {
                return Err("Usage: set <field> <value>".to_string());
            }
            Ok(DashboardInput::Set(field.parse()?, value.to_string()))
        }
        "cancel" => Ok(DashboardInput::Cancel),
        "save" => Ok(DashboardInput::Save),
        "delete" | "rm" => required_arg(rest, "delete <id>").map(DashboardInput::Delete),
        "reload" | "refresh" => Ok(DashboardInput::Reload),
        "help" | "?" => Ok(DashboardInput::Help),
        "quit" | "exit" | "q" => Ok(DashboardInput::Quit),
        "" => Err("Type `help` for a list of commands".to_string()),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn required_arg(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("Usage: {}", usage))
    } else {
        Ok(rest.to_string())
    }
}

pub async fn run(client: ApiClient) -> Result<()> {
    let editor = ResourceListEditor::mount(client).await;
    print!("{}", render_dashboard(&editor.snapshot()?));
    println!("\n{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = match parse_input(&line) {
            Ok(input) => input,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };
        if input == DashboardInput::Quit {
            break;
        }
        if input == DashboardInput::Help {
            println!("{}", HELP);
            continue;
        }

        if let Err(err) = handle(&editor, input).await {
            match user_message(&err) {
                Some(message) => eprintln!("{}", message),
                None => debug!(error = %err, "dashboard command failed"),
            }
        }
        if let Some(alert) = editor.take_alert()? {
            eprintln!("\n!! {}\n", alert);
        }
        print!("\n{}", render_dashboard(&editor.snapshot()?));
    }

    editor.unmount()?;
    Ok(())
}

/// Errors the user caused directly. Backend failures are already shown
/// through the status line or an alert.
fn user_message(err: &EditorError) -> Option<String> {
    match err {
        EditorError::Validation(field) => Some(format!("Please fill out {}.", field)),
        EditorError::UnknownRecord(id) => Some(format!("No DPP with id {} in the list.", id)),
        _ => None,
    }
}

async fn handle(editor: &ResourceListEditor, input: DashboardInput) -> Result<(), EditorError> {
    match input {
        DashboardInput::New => editor.begin_create(),
        DashboardInput::Edit(id) => editor.begin_edit_by_id(&id),
        DashboardInput::Set(field, value) => editor.set_field(field, value),
        DashboardInput::Cancel => editor.cancel_edit(),
        DashboardInput::Save => editor.save().await,
        DashboardInput::Delete(id) => editor.delete(&id).await,
        DashboardInput::Reload => editor.load().await.map(|_| ()),
        DashboardInput::Help | DashboardInput::Quit => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_assignment_with_spaces_in_value() {
        assert_eq!(
            parse_input("set name  Eco Friendly Chair "),
            Ok(DashboardInput::Set(FormField::Name, "Eco Friendly Chair".into()))
        );
        assert_eq!(
            parse_input("SET status"),
            Ok(DashboardInput::Set(FormField::Status, String::new()))
        );
    }

    #[test]
    fn parses_id_commands() {
        assert_eq!(parse_input("edit 665f1c"), Ok(DashboardInput::Edit("665f1c".into())));
        assert_eq!(parse_input("rm 665f1c"), Ok(DashboardInput::Delete("665f1c".into())));
        assert!(parse_input("delete").is_err());
    }

    #[test]
    fn unknown_record_and_validation_errors_reach_the_user() {
        assert_eq!(
            user_message(&EditorError::UnknownRecord("ghost".into())).as_deref(),
            Some("No DPP with id ghost in the list.")
        );
        assert_eq!(
            user_message(&EditorError::Validation(FormField::Status)).as_deref(),
            Some("Please fill out Status.")
        );
        assert!(user_message(&EditorError::Unmounted).is_none());
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_input("frobnicate").is_err());
        assert!(parse_input("set price 10").is_err());
        assert!(parse_input("   ").is_err());
        assert_eq!(parse_input("q"), Ok(DashboardInput::Quit));
    }
}
