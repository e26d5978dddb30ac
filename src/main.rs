use audioleft::{AudioLeft, AudioLeftError, Cli, OutputFormatter, OutputMode};
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();
    setup_logging(&cli);

    let audioleft = match AudioLeft::from_cli(&cli) {
        Ok(audioleft) => audioleft,
        Err(e) => {
            print_startup_error(&e);
            return e.exit_code();
        }
    };

    if cli.dry_run {
        return handle_dry_run(&cli, &audioleft).await;
    }

    match audioleft
        .extract_audio(&cli.input, cli.output.as_deref())
        .await
    {
        Ok(report) => {
            audioleft.output_formatter().print_extraction_report(&report);
            0
        }
        Err(e) => {
            log::debug!("extraction failed: {:?}", e);
            audioleft.handle_error(&e);
            e.exit_code()
        }
    }
}

async fn handle_dry_run(cli: &Cli, audioleft: &AudioLeft) -> i32 {
    let formatter = audioleft.output_formatter();

    formatter.step("DRY RUN MODE - ffmpeg will not be run");
    formatter.rule();

    let plan = match audioleft.plan(&cli.input, cli.output.as_deref()).await {
        Ok(plan) => plan,
        Err(e) => {
            audioleft.handle_error(&e);
            return e.exit_code();
        }
    };

    if formatter.mode() == OutputMode::Json {
        formatter.print_json(&serde_json::json!({
            "type": "plan",
            "plan": plan,
            "config": audioleft.config(),
        }));
        return 0;
    }

    formatter.field("Input", &plan.input.display().to_string());
    formatter.field("Output", &plan.output.display().to_string());
    if let Some(ref codec) = plan.codec {
        formatter.field("Codec", codec);
    }
    formatter.field("Command", &plan.command);

    match plan.ffmpeg {
        Some(ref path) => formatter.info(&format!("ffmpeg found at {}", path.display())),
        None => formatter.warning("ffmpeg was not found on your PATH; a real run would fail"),
    }

    formatter.rule();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform the extraction");

    0
}

fn print_startup_error(error: &AudioLeftError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(cli: &Cli) {
    let env = env_logger::Env::default().default_filter_or(cli.log_filter());

    // Ignore a second initialisation (tests call into here more than once).
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
