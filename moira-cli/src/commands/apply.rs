//! `moira-dumper --action apply --file <file> | --directory <dir>`

use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use moira_api::{
    Action, ApplyOptions, DocumentOutcome, MoiraClient, SubscriptionOutcome, Transport,
    TriggerOutcome, UserSettingsOutcome,
};
use moira_sync::{apply_dir, apply_file, FileOutcome};

pub fn run_file<T: Transport>(
    client: &MoiraClient<T>,
    path: &Path,
    options: ApplyOptions,
) -> Result<()> {
    let outcome = apply_file(client, path, options)
        .with_context(|| format!("apply of '{}' failed", path.display()))?;
    print_outcome(path, &outcome);
    Ok(())
}

pub fn run_dir<T: Transport>(
    client: &MoiraClient<T>,
    dir: &Path,
    options: ApplyOptions,
) -> Result<()> {
    let reports = apply_dir(client, dir, options)
        .with_context(|| format!("apply of '{}' failed", dir.display()))?;

    let mut failed = 0;
    for report in &reports {
        match &report.result {
            Ok(outcome) => print_outcome(&report.path, outcome),
            Err(e) => {
                failed += 1;
                println!("{} {}: {e}", "✗".red().bold(), report.path.display());
            }
        }
    }

    if reports.is_empty() {
        println!("No YAML files found in {}", dir.display());
    }
    if failed > 0 {
        bail!("{failed} of {} files failed to apply", reports.len());
    }
    Ok(())
}

fn print_outcome(path: &Path, outcome: &FileOutcome) {
    match outcome {
        FileOutcome::Applied(DocumentOutcome::Trigger(t)) => print_trigger(t),
        FileOutcome::Applied(DocumentOutcome::User(u)) => print_user(u),
        FileOutcome::Applied(DocumentOutcome::TagsSkipped(_)) => {
            println!("Tags are created automatically together with triggers")
        }
        FileOutcome::Unsupported { declared } => println!(
            "{} {}: unsupported type '{declared}', skipped",
            "⚠".yellow().bold(),
            path.display()
        ),
    }
}

fn prefix(dry_run: bool) -> &'static str {
    if dry_run {
        "[dry-run] "
    } else {
        ""
    }
}

fn print_trigger(outcome: &TriggerOutcome) {
    let p = prefix(outcome.dry_run);
    let name = &outcome.name;
    let id = outcome
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());

    match &outcome.action {
        Action::Created if outcome.dry_run => println!("{p}Would create trigger '{name}'"),
        Action::Created => println!("{p}Create trigger '{name}', id: {}", id.green()),
        Action::Updated { fields } => {
            println!("{p}Trigger '{name}' already exist, id: {id}");
            println!(
                "{p}Trigger '{name}' has updated fields: {}",
                fields.join(", ").yellow()
            );
        }
        Action::UpToDate => {
            println!("{p}Trigger '{name}' already exist, id: {id}");
            println!("{}", format!("{p}Trigger '{name}' is up to date").dimmed());
        }
    }
}

fn print_user(outcome: &UserSettingsOutcome) {
    let p = prefix(outcome.dry_run);
    let login = &outcome.login;
    println!("{p}Set login as '{login}'");

    for contact in &outcome.contacts_created {
        let verb = if outcome.dry_run {
            "would be created"
        } else {
            "was created"
        };
        let id = contact
            .id
            .as_ref()
            .map(|id| format!(", id: {id}"))
            .unwrap_or_default();
        println!(
            "{p}Contact {} for user '{login}' {verb}{id}",
            format!("{}:{}", contact.kind, contact.value).green()
        );
    }
    if outcome.contacts_reused > 0 {
        println!(
            "{p}{} contact reference(s) for user '{login}' already exist",
            outcome.contacts_reused
        );
    }

    if let Some(subscriptions) = &outcome.subscriptions {
        for s in subscriptions {
            print_subscription(login, s);
        }
    }
}

fn print_subscription(login: &str, outcome: &SubscriptionOutcome) {
    let p = prefix(outcome.dry_run);
    let tags = outcome.tags.join(", ");
    match &outcome.action {
        Action::Created if outcome.dry_run => {
            println!("{p}Would create subscription of '{login}' for tags [{tags}]")
        }
        Action::Created => {
            let id = outcome.id.as_deref().unwrap_or("-");
            println!(
                "{p}Create subscription of '{login}' for tags [{tags}], id: {}",
                id.green()
            )
        }
        Action::Updated { fields } => println!(
            "{p}Subscription of '{login}' for tags [{tags}] has updated fields: {}",
            fields.join(", ").yellow()
        ),
        Action::UpToDate => println!(
            "{}",
            format!("{p}Subscription of '{login}' for tags [{tags}] is up to date").dimmed()
        ),
    }
}
