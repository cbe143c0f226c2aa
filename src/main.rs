use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use indoc::indoc;

use term_overlay::config::EngineConfig;
use term_overlay::content::{
    FilterOption, Notification, NotificationKind, ResultItem, StaticSearchSource,
};
use term_overlay::dashboard::Dashboard;
use term_overlay::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_overlay::drivers::{InputDriver, OutputDriver};
use term_overlay::event_loop::EventLoop;
use term_overlay::geometry::Viewport;
use term_overlay::host::OverlayHost;
use term_overlay::input::{HostInput, translate};
use term_overlay::log_buffer::{LogHandle, set_global_log};
use term_overlay::navigator::NavigationPolicy;
use term_overlay::tracing_sub;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const DEMO_INDEX: &str = indoc! {"
    Projects|p-apollo|Apollo rollout
    Users|u-ada|Ada Lovelace
    Teams|t-platform|Platform team
    Users|u-grace|Grace Hopper
    Projects|p-hermes|Hermes migration
    Teams|t-design|Design team
    Users|u-alan|Alan Turing
    Projects|p-team|Team offsite planning
"};

#[derive(Parser, Debug)]
#[command(
    name = "term-overlay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Dashboard demo for the anchored overlay engine"
)]
struct Cli {
    /// Cells kept between an overlay and every terminal edge.
    #[arg(long, value_name = "CELLS", default_value_t = 1)]
    margin: u16,

    /// Cells between a trigger and the overlay anchored to it.
    #[arg(long, value_name = "CELLS", default_value_t = 0)]
    gap: u16,

    /// Page scroll, in rows, after which an anchored overlay closes.
    #[arg(long, value_name = "ROWS", default_value_t = 3)]
    scroll_threshold: u16,

    /// Delay between the last keystroke and the search refilter.
    #[arg(long, value_name = "MS", default_value_t = 300)]
    debounce_ms: u64,

    /// Period of the log-tail refresh.
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    poll_ms: u64,

    /// Wrap around at the ends of the search results.
    #[arg(long)]
    wrap_search: bool,

    /// Most verbose level shown in the log pane.
    #[arg(long, value_name = "LEVEL", default_value_t = tracing::Level::DEBUG)]
    log_level: tracing::Level,
}

impl TryFrom<&Cli> for EngineConfig {
    type Error = String;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if !(10..=5_000).contains(&cli.debounce_ms) {
            return Err("debounce must be between 10 and 5000 ms".to_string());
        }
        if !(50..=60_000).contains(&cli.poll_ms) {
            return Err("poll interval must be between 50 and 60000 ms".to_string());
        }
        let search_navigation = if cli.wrap_search {
            NavigationPolicy::Wrap
        } else {
            NavigationPolicy::Clamp
        };
        Ok(Self {
            margin: cli.margin,
            gap: cli.gap,
            scroll_threshold: cli.scroll_threshold,
            debounce: Duration::from_millis(cli.debounce_ms),
            poll_interval: Duration::from_millis(cli.poll_ms),
            search_navigation,
            ..Self::terminal()
        })
    }
}

fn demo_source() -> StaticSearchSource {
    let items = DEMO_INDEX
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '|');
            let group = parts.next()?;
            let id = parts.next()?;
            let label = parts.next()?;
            Some(ResultItem::new(id, label, group))
        })
        .collect();
    StaticSearchSource::new(items)
}

fn demo_notifications() -> Vec<Notification> {
    vec![
        Notification::new(
            "n-deploy",
            NotificationKind::Success,
            "Deploy finished",
            "Apollo rollout reached production",
            "2m",
        ),
        Notification::new(
            "n-quota",
            NotificationKind::Warning,
            "Quota at 90%",
            "Storage for Platform team is almost full",
            "1h",
        ),
        Notification::new(
            "n-invite",
            NotificationKind::Info,
            "New member",
            "Grace Hopper joined Design team",
            "3h",
        ),
    ]
}

fn demo_filters() -> Vec<FilterOption> {
    vec![
        FilterOption::new("open", "Open"),
        FilterOption::new("mine", "Assigned to me"),
        FilterOption::new("closed", "Closed"),
    ]
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::try_from(&cli).map_err(io::Error::other)?;

    let log = LogHandle::default();
    set_global_log(log.clone());
    tracing_sub::init_with_level(cli.log_level);

    let (width, height) = crossterm::terminal::size()?;
    let mut host = OverlayHost::new(
        config,
        Viewport::new(width, height),
        Box::new(demo_source()),
    );
    host.set_notifications(demo_notifications());
    host.set_filter_options(demo_filters());
    let mut dashboard = Dashboard::mount(&mut host, log).map_err(io::Error::other)?;

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut input = ConsoleInputDriver::new();
    input.set_mouse_capture(true)?;
    host.start(Instant::now());
    tracing::info!("dashboard ready");

    let mut event_loop = EventLoop::new(input, FRAME_INTERVAL);
    let result = event_loop.run(|_, event| {
        let now = Instant::now();
        let Some(event) = event else {
            let events = host.tick(now);
            let flow = dashboard.apply(&mut host, &events);
            output.draw(|mut frame| dashboard.render(&host, &mut frame))?;
            return Ok(flow);
        };
        let events = match translate(&event) {
            Some(HostInput::Doc(doc_event)) => host.handle_event(doc_event, now),
            Some(HostInput::Resize(viewport)) => {
                host.resize(viewport);
                dashboard.layout(&mut host);
                Vec::new()
            }
            None => Vec::new(),
        };
        Ok(dashboard.apply(&mut host, &events))
    });

    host.unmount();
    output.exit()?;
    result
}
