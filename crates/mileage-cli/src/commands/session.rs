//! The `session` command: interactive menu on a TTY, scripted otherwise.

use chrono::NaiveDate;
use dialoguer::{Confirm, Input, Select};

use mileage_core::{ClearOutcome, LedgerSession, Purpose, View};

use crate::app::AppContext;
use crate::cli::SessionArgs;
use crate::output::render_log;
use crate::ui::{self, Spinner, UiContext};

use super::script::{run_script, ScriptEnv};
use super::{print_export, print_notice, save_export};

const MENU: [&str; 6] = [
    "Add trip",
    "Add expense",
    "View log",
    "Export to Excel",
    "Clear all data",
    "Quit",
];

pub fn handle_session(app: &AppContext, args: &SessionArgs) -> anyhow::Result<()> {
    let ctx = app.ui(false);
    let interactive = !args.no_input && ctx.is_interactive();
    let mut session = app.session(interactive)?;

    if interactive {
        return run_interactive(app, &ctx, &mut session);
    }

    let config = app.config()?;
    let env = ScriptEnv {
        ui: &ctx,
        runtime: app.runtime()?,
        export_dir: config.export_dir(),
        today: config.today()?,
    };
    let stdin = std::io::stdin();
    match run_script(stdin.lock(), &mut session, &env)? {
        Some(failure) => Err(failure.into()),
        None => Ok(()),
    }
}

fn menu_default(view: View) -> usize {
    match view {
        View::AddTrip => 0,
        View::AddExpense => 1,
        View::Log => 2,
    }
}

fn run_interactive(
    app: &AppContext,
    ctx: &UiContext,
    session: &mut LedgerSession,
) -> anyhow::Result<()> {
    let config = app.config()?;
    if !app.quiet() {
        ui::print(ctx, &ui::header(ctx, "session", None));
        if !session.can_calculate_mileage() {
            ui::print(
                ctx,
                &ui::hint(
                    ctx,
                    "Set GOOGLE_MAPS_API_KEY to calculate trip mileage from locations.",
                ),
            );
        }
    }

    loop {
        let choice = Select::new()
            .with_prompt("What next?")
            .items(&MENU[..])
            .default(menu_default(session.view()))
            .interact_opt()?;

        match choice {
            Some(0) => {
                session.set_view(View::AddTrip);
                prompt_trip(app, ctx, session, config.today()?)?;
            }
            Some(1) => {
                session.set_view(View::AddExpense);
                prompt_expense(ctx, session, config.today()?)?;
            }
            Some(2) => {
                session.set_view(View::Log);
                ui::print(ctx, &render_log(ctx, session.entries()));
            }
            Some(3) => {
                let dir = config.export_dir();
                let saved = session.export_with(config.today()?, |file| save_export(file, &dir));
                if let Ok((file, path)) = saved {
                    print_export(ctx, &file, &path);
                }
            }
            Some(4) => {
                if session.request_clear() == ClearOutcome::ConfirmationRequired {
                    print_notice(ctx, session);
                    let again = Confirm::new()
                        .with_prompt("Clear All Data")
                        .default(false)
                        .interact()?;
                    if again {
                        session.request_clear();
                    }
                }
            }
            _ => break,
        }

        print_notice(ctx, session);
    }

    Ok(())
}

fn prompt_purpose(current: Purpose) -> anyhow::Result<Purpose> {
    let options = [Purpose::Business, Purpose::Personal];
    let default = options.iter().position(|p| *p == current).unwrap_or(0);
    let index = Select::new()
        .with_prompt("Purpose")
        .items(&["Business", "Personal"][..])
        .default(default)
        .interact()?;
    Ok(options[index])
}

fn prompt_text(prompt: &str, initial: &str) -> anyhow::Result<String> {
    Ok(Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?)
}

fn date_initial(current: &str, today: NaiveDate) -> String {
    if current.trim().is_empty() {
        today.format("%Y-%m-%d").to_string()
    } else {
        current.to_string()
    }
}

fn prompt_trip(
    app: &AppContext,
    ctx: &UiContext,
    session: &mut LedgerSession,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let form = session.trip_form().clone();
    let date = prompt_text("Date (YYYY-MM-DD)", &date_initial(&form.date, today))?;
    let purpose = prompt_purpose(form.purpose)?;
    let start = prompt_text("Start location", &form.start_location)?;
    let end = prompt_text("End location", &form.end_location)?;

    {
        let form = session.trip_form_mut();
        form.date = date;
        form.purpose = purpose;
        form.start_location = start;
        form.end_location = end;
    }

    let has_route = !session.trip_form().start_location.trim().is_empty()
        && !session.trip_form().end_location.trim().is_empty();
    if has_route
        && Confirm::new()
            .with_prompt("Calculate mileage from locations?")
            .default(session.can_calculate_mileage())
            .interact()?
    {
        let spinner = Spinner::start(ctx, "Calculating mileage");
        let result = app.runtime()?.block_on(session.calculate_mileage());
        spinner.finish();
        print_notice(ctx, session);
        if let Err(e) = result {
            log::debug!("Mileage calculation failed: {}", e);
        }
    }

    let distance = prompt_text("Mileage (miles)", &session.trip_form().distance)?;
    let notes = prompt_text("Notes", &session.trip_form().notes)?;
    {
        let form = session.trip_form_mut();
        form.distance = distance;
        form.notes = notes;
    }

    // Failure leaves the form filled in for the next attempt.
    let _ = session.add_trip();
    Ok(())
}

fn prompt_expense(
    ctx: &UiContext,
    session: &mut LedgerSession,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let form = session.expense_form().clone();
    let date = prompt_text("Date (YYYY-MM-DD)", &date_initial(&form.date, today))?;
    let purpose = prompt_purpose(form.purpose)?;
    let description = prompt_text("Description", &form.description)?;
    let amount = prompt_text("Amount", &form.amount)?;

    {
        let form = session.expense_form_mut();
        form.date = date;
        form.purpose = purpose;
        form.description = description;
        form.amount = amount;
    }

    if session.expense_form().receipt.is_some() {
        let keep = Confirm::new()
            .with_prompt("Keep the attached receipt photo?")
            .default(true)
            .interact()?;
        if !keep {
            session.clear_receipt();
            print_notice(ctx, session);
        }
    } else if session.can_capture_receipt()
        && Confirm::new()
            .with_prompt("Attach a receipt photo?")
            .default(false)
            .interact()?
    {
        let _ = session.capture_receipt();
        print_notice(ctx, session);
    }

    let _ = session.add_expense();
    Ok(())
}
