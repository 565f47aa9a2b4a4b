//! ARQ 滑动窗口仿真
//!
//! 按配置运行一次发送端 → 接收端的可靠传输，输出统计信息，可选输出逐帧文本与可视化 JSON。

use arq_sim::arq::{ArqConfig, ArqSession, ArqWorld};
use arq_sim::sim::{SimTime, Simulator};
use arq_sim::viz::TextRenderer;
use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "arq-sim", about = "ARQ 滑动窗口仿真：有界窗口 + 超时重传 + 分组/ACK 丢失注入")]
struct Args {
    /// JSON 配置文件；命令行参数覆盖文件中的值
    #[arg(long)]
    config: Option<PathBuf>,

    /// 发送窗口大小
    #[arg(long)]
    window_size: Option<u64>,

    /// 分组总数
    #[arg(long)]
    total_packets: Option<u64>,

    /// 超时时长（毫秒）
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// 在中点丢弃的分组序号，逗号分隔
    #[arg(long, value_delimiter = ',')]
    lost_packets: Option<Vec<u64>>,

    /// 在中点丢弃的 ACK 序号，逗号分隔
    #[arg(long, value_delimiter = ',')]
    lost_acks: Option<Vec<u64>>,

    /// 每个 60Hz 帧前进的信道单位数
    #[arg(long)]
    speed: Option<f64>,

    /// 信道长度
    #[arg(long)]
    channel_length: Option<f64>,

    /// 错峰发送间隔（毫秒）
    #[arg(long)]
    release_gap_ms: Option<u64>,

    /// ACK 生成延迟（毫秒）
    #[arg(long)]
    ack_delay_ms: Option<u64>,

    /// tick 间隔（微秒），默认 60Hz
    #[arg(long, default_value_t = 16_667)]
    tick_us: u64,

    /// 最多运行多少个 tick
    #[arg(long, default_value_t = 1_000_000)]
    max_ticks: u64,

    /// 每隔多少个 tick 打印一帧文本渲染；0 表示不打印
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// 输出可视化 JSON 事件文件；不填则不生成
    #[arg(long)]
    viz_json: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<ArqConfig, Box<dyn Error>> {
    let mut cfg = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| format!("read config {}: {e}", path.display()))?;
            serde_json::from_str::<ArqConfig>(&raw)
                .map_err(|e| format!("parse config {}: {e}", path.display()))?
        }
        None => ArqConfig::default(),
    };
    if let Some(v) = args.window_size {
        cfg.window_size = v;
    }
    if let Some(v) = args.total_packets {
        cfg.total_packets = v;
    }
    if let Some(v) = args.timeout_ms {
        cfg.timeout_ms = v;
    }
    if let Some(v) = &args.lost_packets {
        cfg.lost_packets = v.iter().copied().collect();
    }
    if let Some(v) = &args.lost_acks {
        cfg.lost_acks = v.iter().copied().collect();
    }
    if let Some(v) = args.speed {
        cfg.transmission_speed = v;
    }
    if let Some(v) = args.channel_length {
        cfg.channel_length = v;
    }
    if let Some(v) = args.release_gap_ms {
        cfg.release_gap_ms = v;
    }
    if let Some(v) = args.ack_delay_ms {
        cfg.ack_delay_ms = v;
    }
    Ok(cfg)
}

fn run(args: Args) -> Result<bool, Box<dyn Error>> {
    let cfg = load_config(&args)?;

    let mut session = ArqSession::new();
    if args.viz_json.is_some() {
        session = session.with_viz();
    }
    session.configure(cfg)?;
    session.start()?;

    let mut world: ArqWorld = ArqWorld::new(session);
    if args.frames > 0 {
        world = world.with_renderer(TextRenderer::default(), args.frames);
    }

    let mut sim = Simulator::new(SimTime::from_micros(args.tick_us));
    let finished = sim.run(&mut world, args.max_ticks);

    if let Some(r) = world.renderer.as_ref() {
        for frame in &r.frames {
            println!("{frame}");
        }
    }

    if let Some(path) = args.viz_json {
        if let Some(v) = world.session.machine_mut().and_then(|m| m.viz.take()) {
            let json = v.to_json_pretty()?;
            fs::write(&path, json)?;
            eprintln!("wrote viz events to {}", path.display());
        }
    }

    let snap = world.session.snapshot()?;
    let s = &snap.stats;
    println!(
        "done @ {}, ticks={}\n  arq: complete={}, completed_packets={}/{}, base={}\n  stats: transmissions={}, retransmissions={}, packets_lost={}, acks_sent={}, acks_lost={}, acks_delivered={}, timeouts_fired={}",
        snap.now,
        sim.ticks(),
        snap.is_complete,
        snap.completed_packets,
        snap.packets.len(),
        snap.window.base,
        s.transmissions,
        s.retransmissions,
        s.packets_lost,
        s.acks_sent,
        s.acks_lost,
        s.acks_delivered,
        s.timeouts_fired,
    );
    Ok(finished)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("simulation did not complete within the tick budget");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
