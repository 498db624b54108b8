//! Small demonstration binary: builds a `DasherEngine`, feeds it a synthetic
//! two-representation video stream, and prints the resulting manifest.
//! Configuration is layered CLI > TOML file > built-in defaults (§2.11).

use std::collections::{HashMap, VecDeque};

use clap::Parser;
use dasher_engine::arena::StreamIdx;
use dasher_engine::config::DasherConfig;
use dasher_engine::definition::{PresentationType, Profile, StreamType};
use dasher_engine::engine::{init_tracing, DasherEngine, ProcessOutcome};
use dasher_engine::manifest::{build_presentation, ManifestSerializer, PresentationMeta, QuickXmlManifestSerializer};
use dasher_engine::scheduler::{Packet, PacketSource};
use dasher_engine::stream::StreamProps;
use dasher_engine::types::StreamAccessPoint;

#[derive(Parser, Debug)]
#[command(name = "run_segmenter", about = "Segment a synthetic two-representation source")]
struct Cli {
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    segment_duration_secs: Option<f64>,
    #[arg(long)]
    no_align: bool,
    #[arg(long)]
    no_sap: bool,
}

struct SyntheticSource(VecDeque<Packet>);

impl PacketSource for SyntheticSource {
    fn next_packet(&mut self) -> Option<Packet> {
        self.0.pop_front()
    }

    fn is_eos(&self) -> bool {
        self.0.is_empty()
    }
}

fn gop(timescale: u32, seconds: f64, count: usize, gop_frames: usize, frame_rate: f64) -> VecDeque<Packet> {
    let frame_duration = (timescale as f64 / frame_rate) as u64;
    (0..count)
        .map(|i| Packet {
            cts: i as u64 * frame_duration,
            duration: frame_duration,
            sap: (i % gop_frames == 0).then_some(StreamAccessPoint::Type1),
            payload: vec![0u8; 4],
        })
        .take((seconds * frame_rate) as usize)
        .collect()
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => DasherConfig::from_toml_file(path).expect("read config file"),
        None => DasherConfig::default(),
    };
    if let Some(v) = cli.segment_duration_secs {
        config.segment_duration_secs = v;
    }
    if cli.no_align {
        config.align = false;
    }
    if cli.no_sap {
        config.sap = false;
    }

    let mut engine = DasherEngine::new(config.clone());

    let timescale = 30_000;
    let hi = engine.add_stream(StreamProps {
        stream_type: StreamType::Video,
        codec_id: "avc".into(),
        timescale,
        bitrate: 4_000_000,
        width: Some(1920),
        height: Some(1080),
        id: Some("v_hi".into()),
        dash_dur: Some(config.segment_duration_secs),
        ..Default::default()
    });
    let lo = engine.add_stream(StreamProps {
        stream_type: StreamType::Video,
        codec_id: "avc".into(),
        timescale,
        bitrate: 1_000_000,
        width: Some(960),
        height: Some(540),
        id: Some("v_lo".into()),
        dash_dur: Some(config.segment_duration_secs),
        ..Default::default()
    });

    let mut sources: HashMap<StreamIdx, Box<dyn PacketSource>> = HashMap::new();
    sources.insert(hi, Box::new(SyntheticSource(gop(timescale, 10.0, 300, 60, 30.0))));
    sources.insert(lo, Box::new(SyntheticSource(gop(timescale, 10.0, 300, 60, 30.0))));

    loop {
        match engine.process(&mut sources) {
            ProcessOutcome::Progressed => continue,
            ProcessOutcome::NoPacket | ProcessOutcome::AllDone => break,
        }
    }

    let meta = PresentationMeta {
        profiles: vec![Profile::IsoLive],
        presentation_type: PresentationType::Static,
        availability_start_time: None,
        publish_time: None,
        minimum_update_period_secs: config.minimum_update_period_secs,
        min_buffer_time_secs: config.min_buffer_time_secs,
        time_shift_buffer_depth_secs: config.time_shift_buffer_depth_secs,
    };
    let presentation = build_presentation(vec![], &meta).expect("assemble presentation");
    let xml = QuickXmlManifestSerializer
        .serialize(&presentation)
        .expect("serialize manifest");
    println!("{}", String::from_utf8(xml).unwrap());
}
