//! The `doctor` command: configuration and credential checks.

use serde_json::json;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::DoctorArgs;
use crate::ui::{self, Badge, UiContext};

struct Check {
    name: &'static str,
    ok: bool,
    detail: String,
}

fn check_line(ctx: &UiContext, check: &Check) -> String {
    let kind = if check.ok { Badge::Ok } else { Badge::Warn };
    ui::badge(ctx, kind, &format!("{}: {}", check.name, check.detail))
}

fn present(ok: bool) -> String {
    if ok { "present" } else { "missing" }.to_string()
}

pub fn handle_doctor(app: &AppContext, args: &DoctorArgs) -> anyhow::Result<()> {
    let ctx = app.ui(args.json);
    let config_path = resolve_config_path(app.cli())?;
    let config = app.config()?;
    let oauth = config.oauth_config();
    let export_dir = config.export_dir();
    let timezone = config.timezone();

    let checks = vec![
        Check {
            name: "Config",
            ok: true,
            detail: if config_path.exists() {
                config_path.display().to_string()
            } else {
                format!("{} (not found, using defaults)", config_path.display())
            },
        },
        Check {
            name: "Directions API key",
            ok: config.has_directions_key(),
            detail: present(config.has_directions_key()),
        },
        Check {
            name: "OAuth client id",
            ok: oauth.client_id.is_some(),
            detail: present(oauth.client_id.is_some()),
        },
        Check {
            name: "OAuth client secret",
            ok: oauth.client_secret.is_some(),
            detail: present(oauth.client_secret.is_some()),
        },
        Check {
            name: "Export directory",
            ok: export_dir.is_dir(),
            detail: export_dir.display().to_string(),
        },
        Check {
            name: "Timezone",
            ok: timezone.is_ok(),
            detail: match &timezone {
                Ok(tz) => tz.name().to_string(),
                Err(e) => e.to_string(),
            },
        },
    ];

    if ctx.mode.is_json() {
        let value: serde_json::Value = checks
            .iter()
            .map(|c| (c.name.to_string(), json!({ "ok": c.ok, "detail": c.detail })))
            .collect::<serde_json::Map<_, _>>()
            .into();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    ui::print(&ctx, &ui::header(&ctx, "doctor", None));
    for check in &checks {
        ui::print(&ctx, &check_line(&ctx, check));
    }
    if !config.has_directions_key() {
        ui::print(
            &ctx,
            &ui::hint(&ctx, "Mileage can still be entered manually without an API key."),
        );
    }
    Ok(())
}
