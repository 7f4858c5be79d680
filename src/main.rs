use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use dashboard_config::{DashboardConfig, LogLevel, OutputFormat};
use dashboard_core::init_logging;
use dashboard_domain::route::{encode, match_fragment, RouteParams};
use dashboard_domain::Area;
use scheduler_dashboard::Application;
use serde_json::json;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;

fn cli() -> Command {
    let fragment = Arg::new("fragment")
        .value_name("FRAGMENT")
        .help("地址片段，例如 queue/q/foo/p/2")
        .default_value("");

    Command::new("scheduler-dashboard")
        .version("1.0.0")
        .about("分布式任务调度系统管理控制台")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径（不指定时搜索默认路径）"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖配置文件")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，覆盖配置文件")
                .value_parser(["json", "pretty", "text"]),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("open")
                .about("打开片段并输出当前页")
                .arg(fragment.clone()),
        )
        .subcommand(Command::new("counts").about("输出侧边栏计数"))
        .subcommand(
            Command::new("route")
                .about("解析片段并输出规范化参数")
                .arg(fragment.clone()),
        )
        .subcommand(
            Command::new("encode")
                .about("由参数生成片段")
                .arg(
                    Arg::new("area")
                        .value_name("AREA")
                        .required(true)
                        .value_parser([
                            "dashboard",
                            "queue",
                            "history",
                            "schedules",
                            "scheduled-jobs",
                            "workers",
                            "working",
                        ]),
                )
                .arg(number_arg("parent", "所属计划编号（仅 scheduled-jobs）"))
                .arg(
                    Arg::new("search")
                        .short('q')
                        .long("search")
                        .value_name("TEXT")
                        .help("搜索文本"),
                )
                .arg(number_arg("page", "页码").short('p'))
                .arg(number_arg("id", "选中记录编号"))
                .arg(
                    Arg::new("action")
                        .long("action")
                        .value_name("ACTION")
                        .help("选中记录上的操作，例如 edit、delete、signal"),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("按刷新间隔持续打开片段，Ctrl+C 退出")
                .arg(fragment),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mut config = DashboardConfig::load(config_path)
        .with_context(|| format!("加载配置失败: {}", config_path.unwrap_or("<默认路径>")))?;

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.logging.format = format.parse::<OutputFormat>().map_err(anyhow::Error::msg)?;
    }
    init_logging(&config.logging)?;

    match matches.subcommand() {
        Some(("route", args)) => print_route(fragment_arg(args)),
        Some(("encode", args)) => print_encoded(args),
        Some(("open", args)) => {
            let mut app = Application::new(config)?;
            let area = app.open(fragment_arg(args)).await?;
            print_area(&app, area)
        }
        Some(("counts", _)) => {
            let mut app = Application::new(config)?;
            app.refresh_counts().await?;
            for item in app.navigation().items() {
                if let Some(count) = item.count {
                    println!("{:<10} {}", item.title, count);
                }
            }
            Ok(())
        }
        Some(("watch", args)) => {
            let mut app = Application::new(config)?;
            let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
            tokio::spawn(async move {
                wait_for_shutdown_signal().await;
                let _ = shutdown_tx.send(());
            });
            app.watch(fragment_arg(args), shutdown_rx).await?;
            info!("控制台已退出");
            Ok(())
        }
        Some((other, _)) => Err(anyhow::anyhow!("不支持的命令: {other}")),
        None => Err(anyhow::anyhow!("缺少命令")),
    }
}

fn number_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("N")
        .help(help)
        .value_parser(clap::value_parser!(i64))
}

fn parse_area(name: &str) -> Area {
    match name {
        "queue" => Area::Queue,
        "history" => Area::History,
        "schedules" => Area::Schedules,
        "scheduled-jobs" => Area::ScheduledJobs,
        "workers" => Area::Workers,
        "working" => Area::Working,
        _ => Area::Dashboard,
    }
}

fn print_encoded(args: &ArgMatches) -> Result<()> {
    let area = args
        .get_one::<String>("area")
        .map(|name| parse_area(name))
        .context("缺少区域参数")?;
    let number = |name: &str| args.get_one::<i64>(name).copied().unwrap_or_default();

    let mut params = RouteParams::new(area)
        .with_parent(number("parent"))
        .with_page(number("page").max(1))
        .with_id(number("id"));
    if let Some(search) = args.get_one::<String>("search") {
        params = params.with_search(search);
    }
    if let Some(action) = args.get_one::<String>("action") {
        params = params.with_action(action);
    }

    println!("#{}", encode(&params));
    Ok(())
}

fn fragment_arg(args: &ArgMatches) -> &str {
    args.get_one::<String>("fragment")
        .map(String::as_str)
        .unwrap_or("")
}

fn print_route(fragment: &str) -> Result<()> {
    let matched = match_fragment(fragment);
    let params = matched.normalize();
    let output = json!({
        "area": matched.area,
        "pattern": matched.pattern,
        "params": params,
        "fragment": encode(&params),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_area(app: &Application, area: Area) -> Result<()> {
    let Some(state) = app.state(area) else {
        for item in app.navigation().items() {
            println!(
                "{:<10} {}",
                item.title,
                item.count.map(|count| count.to_string()).unwrap_or_default()
            );
        }
        return Ok(());
    };

    let records: Vec<_> = state.collection.iter().map(|record| record.to_wire()).collect();
    let output = json!({
        "area": area,
        "fragment": app.fragment(area),
        "page_number": state.page_number,
        "page_count": state.page_count,
        "total_count": state.total_count,
        "records": records,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
