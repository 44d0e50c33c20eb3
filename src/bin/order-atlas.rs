use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use order_atlas::animation::AnimationEvent;
use order_atlas::models::parse_date;
use order_atlas::tooltip::{format_count, format_metric_value, metric_short_label};
use order_atlas::{
    AnimationState, ChoroplethMetric, Dashboard, DashboardConfig, Granularity, Metric, Timeframe,
    TimeWindow, render, storage,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "order-atlas",
    version,
    about = "Aggregate, animate & summarize retail orders for geographic dashboards"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate orders over a window and print one line per bucket.
    Summary(SummaryArgs),
    /// Play the time-window animation and print one line per frame.
    Animate(AnimateArgs),
    /// Write a symbol sheet (.svg or .png) for the current encodings.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct WindowArgs {
    /// Window start (YYYY-MM-DD, MM/DD/YYYY or DD-MM-YYYY). Open when omitted.
    #[arg(long)]
    start: Option<String>,
    /// Window end, inclusive. Open when omitted.
    #[arg(long)]
    end: Option<String>,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// Orders CSV (Global Superstore layout).
    #[arg(short, long)]
    orders: PathBuf,
    /// Bucket by country or city.
    #[arg(short, long, default_value = "country")]
    granularity: Granularity,
    /// orders, sales, profit, quantity, shipping or discount.
    #[arg(short, long, default_value = "orders")]
    metric: Metric,
    #[command(flatten)]
    window: WindowArgs,
    /// Only show buckets of this country (dataset or boundary name).
    #[arg(long)]
    country: Option<String>,
    /// Save the aggregate mapping as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
    /// Save the aggregate mapping as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Print the tooltip text under each bucket.
    #[arg(long, default_value_t = false)]
    tooltips: bool,
    /// Breakdown shown by country tooltips (with --tooltips at country level).
    #[arg(long, default_value = "orders")]
    heatmap: ChoroplethMetric,
}

#[derive(Args, Debug)]
struct AnimateArgs {
    #[arg(short, long)]
    orders: PathBuf,
    /// day, week, month or proportional. Overrides the config file.
    #[arg(short, long)]
    timeframe: Option<Timeframe>,
    #[command(flatten)]
    window: WindowArgs,
    #[arg(short, long, default_value = "orders")]
    metric: Metric,
    #[arg(short, long, default_value = "city")]
    granularity: Granularity,
    /// Delay between frames in milliseconds. Overrides the config file.
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Dashboard configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(short, long)]
    orders: PathBuf,
    /// Output path; .svg writes SVG, anything else PNG.
    #[arg(long)]
    out: PathBuf,
    #[arg(short, long, default_value = "orders")]
    metric: Metric,
    #[arg(short, long, default_value = "city")]
    granularity: Granularity,
    #[command(flatten)]
    window: WindowArgs,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Width of the sheet (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the sheet (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn parse_bound(flag: &str, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) => parse_date(s).map(Some).ok_or_else(|| {
            anyhow!("invalid {flag} date: {s} (expected YYYY-MM-DD, MM/DD/YYYY or DD-MM-YYYY)")
        }),
    }
}

impl WindowArgs {
    fn to_window(&self) -> Result<TimeWindow> {
        Ok(TimeWindow::new(
            parse_bound("--start", self.start.as_deref())?,
            parse_bound("--end", self.end.as_deref())?,
        ))
    }
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(p) => DashboardConfig::from_json_file(p)
            .with_context(|| format!("reading config {}", p.display())),
        None => Ok(DashboardConfig::default()),
    }
}

fn load_dashboard(orders: &Path, config: DashboardConfig) -> Result<Dashboard> {
    let dataset = storage::load_orders_csv(orders)
        .with_context(|| format!("loading orders from {}", orders.display()))?;
    if dataset.skipped > 0 {
        eprintln!("Skipped {} unreadable row(s)", dataset.skipped);
    }
    Ok(Dashboard::from_dataset(dataset, config))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Summary(args) => cmd_summary(args),
        Command::Animate(args) => cmd_animate(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_summary(args: SummaryArgs) -> Result<()> {
    let window = args.window.to_window()?;
    let mut dash = load_dashboard(&args.orders, DashboardConfig::default())?;
    dash.set_granularity(args.granularity);
    dash.set_metric(args.metric);
    dash.set_heatmap_metric(args.heatmap);
    dash.select_country(args.country.as_deref());
    dash.set_window(window);

    let Some(mapping) = dash.mapping() else {
        bail!("no aggregate mapping available");
    };
    eprintln!(
        "{}: {} order(s) in {} bucket(s) for {}",
        args.metric.label(),
        mapping.total_orders(),
        mapping.len(),
        dash.window()
    );

    if let Some(path) = args.json.as_ref() {
        storage::save_aggregates_json(mapping, path)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Saved {} bucket(s) to {}", mapping.len(), path.display());
    }
    if let Some(path) = args.csv.as_ref() {
        storage::save_aggregates_csv(mapping, path)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Saved {} bucket(s) to {}", mapping.len(), path.display());
    }

    let mut symbols = dash.symbols();
    symbols.sort_by(|a, b| b.value.total_cmp(&a.value));
    let label = metric_short_label(args.metric);
    let mut country_tips = Vec::new();
    for s in &symbols {
        let orders = match s.city.as_deref() {
            Some(city) => mapping.city(&s.country, city).map(|r| r.orders),
            None => mapping.country(&s.country).map(|r| r.orders),
        }
        .unwrap_or(0);
        let name = match s.city.as_deref() {
            Some(city) => format!("{} • {}", s.country, city),
            None => s.country.clone(),
        };
        println!(
            "{name}  orders={}  {label}={}  radius={:.1}",
            format_count(orders as f64),
            format_metric_value(args.metric, s.value),
            s.radius
        );
        if args.tooltips {
            let tip = dash.symbol_tooltip(&s.country, s.city.as_deref());
            for line in tip.lines().skip(1) {
                println!("    {line}");
            }
            if s.city.is_none() {
                country_tips.push(s.country.clone());
            }
        }
    }
    if !country_tips.is_empty() {
        println!("[{}]", args.heatmap.label());
    }
    for country in country_tips {
        println!("{}", dash.country_tooltip(&country));
    }
    Ok(())
}

fn cmd_animate(args: AnimateArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(tf) = args.timeframe {
        config.timeframe = tf;
    }
    if let Some(ms) = args.tick_ms {
        if ms == 0 {
            bail!("--tick-ms must be greater than 0");
        }
        config.tick_period_ms = ms;
    }
    let window = args.window.to_window()?;
    let mut dash = load_dashboard(&args.orders, config)?;
    dash.set_granularity(args.granularity);
    dash.set_metric(args.metric);
    dash.set_window(window);

    let Some(first) = dash.play() else {
        bail!("nothing to animate: no usable dates in {}", window);
    };
    let mut frame = 0usize;
    print_frame(&dash, frame, first, args.metric);

    let period = dash.animation().tick_period();
    let nap = (period / 4).max(Duration::from_millis(1));
    while dash.animation_state() == AnimationState::Playing {
        std::thread::sleep(nap);
        // one tick at a time, so each frame prints the totals of its own window
        while let Some(event) = dash.poll_one() {
            match event {
                AnimationEvent::Advanced(w) => {
                    frame += 1;
                    print_frame(&dash, frame, w, args.metric);
                }
                AnimationEvent::Finished(w) => {
                    eprintln!("Finished after {frame} frame(s); window restored to {w}");
                }
            }
            if args.max_frames.is_some_and(|max| frame >= max) {
                if let Some(w) = dash.stop() {
                    eprintln!("Stopped after {frame} frame(s); window restored to {w}");
                }
                break;
            }
        }
    }
    Ok(())
}

fn print_frame(dash: &Dashboard, frame: usize, window: TimeWindow, metric: Metric) {
    let (orders, buckets) = dash
        .mapping()
        .map(|m| (m.total_orders(), m.len()))
        .unwrap_or((0, 0));
    let max = dash.circle_scale().map(|s| s.domain_max()).unwrap_or(1.0);
    println!(
        "frame {frame}: {window}  orders={}  buckets={}  max {}={}",
        format_count(orders as f64),
        buckets,
        metric_short_label(metric),
        format_metric_value(metric, max)
    );
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let window = args.window.to_window()?;
    let mut dash = load_dashboard(&args.orders, config)?;
    dash.set_granularity(args.granularity);
    dash.set_metric(args.metric);
    dash.set_window(window);

    let symbols = dash.symbols();
    let fills = dash.country_fills();
    render::render_symbol_sheet(&symbols, &fills, &args.out, args.width, args.height)
        .with_context(|| format!("rendering {}", args.out.display()))?;
    eprintln!(
        "Wrote {} symbol(s) and {} fill(s) to {}",
        symbols.len(),
        fills.len(),
        args.out.display()
    );
    Ok(())
}
