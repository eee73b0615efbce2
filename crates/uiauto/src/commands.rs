use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

const LONG_ABOUT: &str = r#"uiauto drives an Android device through the on-device UI automation agent.

The agent listens on the device (default port 7912) and speaks JSON-RPC over
HTTP. Point uiauto at it with --host/--port or the UIAUTO_HOST/UIAUTO_PORT
environment variables.

SELECTORS:
    Element queries take a JSON object keyed by UiSelector field names:

    '{"text": "OK"}'
    '{"resourceId": "com.android.settings:id/title", "instance": 2}'
    '{"className": "android.widget.Button", "clickable": true}'

COORDINATES:
    Values below 1 are fractions of the screen; 0.5 0.5 is the centre.
    Values of 1 or more are pixels.

EXAMPLES:
    # Is the agent up?
    uiauto --host 192.168.1.20 ping

    # Open settings and tap an entry
    uiauto app-start com.android.settings
    uiauto wait '{"text": "Display"}'
    uiauto click 0.5 0.3

    # Read a field, then submit the form
    uiauto text '{"resourceId": "com.app:id/search"}'
    uiauto action search

    # Grab the screen
    uiauto screenshot -o screen.jpg"#;

#[derive(Parser)]
#[command(name = "uiauto")]
#[command(author, version)]
#[command(about = "Drive an Android device through its UI automation agent")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Agent IP address (overrides UIAUTO_HOST)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Agent port (overrides UIAUTO_PORT)
    #[arg(short, long, global = true)]
    pub port: Option<i64>,

    /// Per-request timeout in seconds (overrides UIAUTO_TIMEOUT)
    #[arg(short, long, global = true)]
    pub timeout: Option<i64>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log requests and retries to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Returns the effective output format, considering --json shorthand.
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the agent answers
    Ping,

    /// Show device information
    #[command(long_about = r#"Show device information.

Combines the agent's deviceInfo reply with the serial number.

EXAMPLES:
    uiauto info
    uiauto info --json"#)]
    Info,

    /// Show the screen size in pixels
    #[command(name = "window-size")]
    WindowSize,

    /// Tap a point on the screen
    #[command(long_about = r#"Tap a point on the screen.

Coordinates below 1 are fractions of the screen size.

EXAMPLES:
    uiauto click 540 960
    uiauto click 0.5 0.5"#)]
    #[command(allow_negative_numbers = true)]
    Click {
        /// Horizontal position
        x: f32,
        /// Vertical position
        y: f32,
    },

    /// Swipe between two points
    #[command(long_about = r#"Swipe between two points.

Each step takes about 5ms on the device.

EXAMPLES:
    uiauto swipe 0.5 0.8 0.5 0.2
    uiauto swipe 100 1500 100 300 --steps 40"#)]
    #[command(allow_negative_numbers = true)]
    Swipe {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,

        /// Number of move steps
        #[arg(long, default_value = "10")]
        steps: u32,
    },

    /// Press a hardware key
    #[command(long_about = r#"Press a hardware key.

KEY is a name (home, back, menu, enter, volume_up, power, ...), an Android
key code, or code:meta for a key code with a meta state.

EXAMPLES:
    uiauto press home
    uiauto press 66
    uiauto press 29:4096"#)]
    Press {
        /// Key name, key code or code:meta
        key: String,
    },

    /// Wake the screen and dismiss the keyguard
    Unlock,

    /// Run a shell command on the device
    #[command(long_about = r#"Run a shell command on the device.

The command runs through the agent, not adb. A non-zero exit code is an error.

EXAMPLES:
    uiauto shell getprop ro.build.version.release
    uiauto shell --shell-timeout 120 pm list packages"#)]
    Shell {
        /// Seconds the agent waits for the command
        #[arg(long, default_value = "60")]
        shell_timeout: u64,

        /// Command and arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Dump the UI hierarchy as XML
    Dump {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Take a screenshot
    #[command(long_about = r#"Take a screenshot.

Without -o the image is printed as base64.

EXAMPLES:
    uiauto screenshot -o screen.jpg
    uiauto screenshot --json"#)]
    Screenshot {
        /// Image file to write
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Count elements matching a selector
    Count {
        /// Selector as JSON
        selector: String,
    },

    /// Print the text of an element
    Text {
        /// Selector as JSON
        selector: String,
    },

    /// Wait for an element to appear or disappear
    #[command(long_about = r#"Wait for an element to appear or disappear.

Polls the agent until the element exists (or, with --gone, no longer
exists). Gives up after --retries checks spaced --duration seconds apart
and exits with the not-found status.

EXAMPLES:
    uiauto wait '{"text": "Done"}'
    uiauto wait '{"className": "android.widget.ProgressBar"}' --gone
    uiauto wait '{"text": "Ready"}' --duration 1 --retries 10"#)]
    Wait {
        /// Selector as JSON
        selector: String,

        /// Wait for the element to go away
        #[arg(long)]
        gone: bool,

        /// Seconds between checks
        #[arg(long)]
        duration: Option<f32>,

        /// Number of checks before giving up
        #[arg(long)]
        retries: Option<i64>,
    },

    /// Show the foreground package and activity
    #[command(name = "current-app")]
    CurrentApp,

    /// Send an IME editor action
    #[command(long_about = r#"Send an IME editor action.

Switches to FastInputIME if needed, then broadcasts the action.
NAME is go, search, send, next, done, previous or a numeric code.

EXAMPLES:
    uiauto action search
    uiauto action done"#)]
    Action {
        /// Action name or code
        name: String,
    },

    /// Launch an app by package name
    #[command(name = "app-start")]
    AppStart { package: String },

    /// Force-stop an app by package name
    #[command(name = "app-stop")]
    AppStop { package: String },
}

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
