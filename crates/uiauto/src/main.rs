use clap::Parser;

use uiauto::Device;
use uiauto::Error;
use uiauto::commands::Cli;
use uiauto::commands::Commands;
use uiauto::handlers;
use uiauto::handlers::HandlerContext;
use uiauto::telemetry;
use uiauto_common::Colors;
use uiauto_common::color_init;
use uiauto_core::Position;
use uiauto_rpc::ClientConfig;
use uiauto_rpc::ClientError;
use uiauto_rpc::ErrorCategory;

fn main() {
    if let Err(e) = run() {
        if let Some(error) = e.downcast_ref::<Error>() {
            eprintln!("{} {}", Colors::error("Error:"), error);
            if let Some(suggestion) = error.suggestion() {
                eprintln!("{} {}", Colors::dim("Suggestion:"), suggestion);
            }
            if error.is_retryable() {
                eprintln!(
                    "{}",
                    Colors::dim("(This error may be transient - retry may succeed)")
                );
            }
            std::process::exit(exit_code_for_category(error.category()));
        } else if let Some(client_error) = e.downcast_ref::<ClientError>() {
            eprintln!("{} {}", Colors::error("Error:"), client_error);
            if let Some(suggestion) = client_error.suggestion() {
                eprintln!("{} {}", Colors::dim("Suggestion:"), suggestion);
            }
            std::process::exit(exit_code_for_category(client_error.category()));
        } else {
            eprintln!("{} {}", Colors::error("Error:"), e);
            std::process::exit(1);
        }
    }
}

fn exit_code_for_category(category: ErrorCategory) -> i32 {
    match category {
        ErrorCategory::InvalidInput => 64, // EX_USAGE
        ErrorCategory::NotFound => 69,     // EX_UNAVAILABLE
        ErrorCategory::External => 74,     // EX_IOERR
        ErrorCategory::Internal => 74,     // EX_IOERR
        ErrorCategory::Timeout => 75,      // EX_TEMPFAIL
    }
}

/// Environment first, then flags on top.
fn client_config(cli: &Cli) -> Result<ClientConfig, Error> {
    let mut config = ClientConfig::from_env()?;
    if let Some(host) = &cli.host {
        config = config.with_host(host)?;
    }
    if let Some(port) = cli.port {
        config = config.with_port(port)?;
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(timeout);
    }
    Ok(config)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    color_init(cli.no_color);
    let _telemetry = telemetry::init_tracing(telemetry::default_level(cli.verbose));

    let config = client_config(&cli)?;
    tracing::debug!(url = %config.base_url(), "Connecting to agent");
    let device = Device::new(config)?;

    let format = cli.effective_format();
    let mut ctx = HandlerContext::new(&device, format);

    match cli.command {
        Commands::Ping => handlers::handle_ping(&mut ctx)?,
        Commands::Info => handlers::handle_info(&mut ctx)?,
        Commands::WindowSize => handlers::handle_window_size(&mut ctx)?,
        Commands::Click { x, y } => handlers::handle_click(&mut ctx, x, y)?,
        Commands::Swipe {
            x1,
            y1,
            x2,
            y2,
            steps,
        } => handlers::handle_swipe(
            &mut ctx,
            Position::new(x1, y1),
            Position::new(x2, y2),
            steps,
        )?,
        Commands::Press { key } => handlers::handle_press(&mut ctx, key)?,
        Commands::Unlock => handlers::handle_unlock(&mut ctx)?,
        Commands::Shell {
            command,
            shell_timeout,
        } => handlers::handle_shell(&mut ctx, command, shell_timeout)?,
        Commands::Dump { output } => handlers::handle_dump(&mut ctx, output)?,
        Commands::Screenshot { output } => handlers::handle_screenshot(&mut ctx, output)?,
        Commands::Count { selector } => handlers::handle_count(&mut ctx, selector)?,
        Commands::Text { selector } => handlers::handle_text(&mut ctx, selector)?,
        Commands::Wait {
            selector,
            gone,
            duration,
            retries,
        } => handlers::handle_wait(&mut ctx, selector, gone, duration, retries)?,
        Commands::CurrentApp => handlers::handle_current_app(&mut ctx)?,
        Commands::Action { name } => handlers::handle_action(&mut ctx, name)?,
        Commands::AppStart { package } => handlers::handle_app_start(&mut ctx, package)?,
        Commands::AppStop { package } => handlers::handle_app_stop(&mut ctx, package)?,
    }

    Ok(())
}
