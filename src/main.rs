// Copyright 2020 TwoCookingMice

use restir_di::core::config::RenderSettings;
use restir_di::core::scene_loader::load_scene_from_file;
use restir_di::io::exr_utils;
use restir_di::renderers::progressive::{ProgressiveRenderer, Renderer};

use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::process;
use std::time::Instant;

struct Options {
    spp: Option<u32>,
    m_area: Option<i64>,
    m_bsdf: Option<i64>,
    seed: Option<u64>,
    stable_noise: bool,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options { spp: None, m_area: None, m_bsdf: None, seed: None, stable_noise: false };
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i).cloned().ok_or_else(|| format!("{} expects a value", flag))
        };
        match flag {
            "--spp" => options.spp = Some(value()?.parse::<u32>().map_err(|_| "--spp expects a count".to_string())?),
            "--m-area" => options.m_area = Some(value()?.parse::<i64>().map_err(|_| "--m-area expects an integer".to_string())?),
            "--m-bsdf" => options.m_bsdf = Some(value()?.parse::<i64>().map_err(|_| "--m-bsdf expects an integer".to_string())?),
            "--seed" => options.seed = Some(value()?.parse::<u64>().map_err(|_| "--seed expects an integer".to_string())?),
            "--stable-noise" => options.stable_noise = true,
            other => return Err(format!("unknown option: {}", other)),
        }
        i += 1;
    }
    Ok(options)
}

fn apply_options(settings: &mut RenderSettings, options: &Options) {
    if let Some(spp) = options.spp {
        settings.samples = spp;
    }
    if let Some(seed) = options.seed {
        settings.seed = seed;
    }
    settings.stable_noise |= options.stable_noise;
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <scene.xml> <output.exr> [--spp N] [--m-area N] [--m-bsdf N] [--seed N] [--stable-noise]", args[0]);
        process::exit(1);
    }

    let options = parse_options(&args[3..]).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });

    let description = load_scene_from_file(&args[1]).unwrap_or_else(|e| {
        eprintln!("Failed to load {}: {}", args[1], e);
        process::exit(2);
    });

    let mut settings = description.settings;
    apply_options(&mut settings, &options);
    let samples = settings.samples.max(1);

    let mut renderer = ProgressiveRenderer::new(description.scene, description.sensor, settings)
        .unwrap_or_else(|e| {
            eprintln!("Invalid render settings: {}", e);
            process::exit(2);
        });
    if options.m_area.is_some() || options.m_bsdf.is_some() {
        let m_area = options.m_area.unwrap_or(renderer.settings().m_area as i64);
        let m_bsdf = options.m_bsdf.unwrap_or(renderer.settings().m_bsdf as i64);
        if let Err(e) = renderer.set_candidate_counts(m_area, m_bsdf) {
            eprintln!("Invalid candidate counts: {}", e);
            process::exit(2);
        }
    }

    let progress = ProgressBar::new(samples as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} samples")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let start = Instant::now();
    for _ in 0..samples {
        renderer.advance_sample();
        progress.inc(1);
    }
    progress.finish_and_clear();
    log::info!("Rendered {} samples in {:.2?}", renderer.sample_count(), start.elapsed());

    if let Err(e) = exr_utils::write_exr_to_file(renderer.image(), &args[2]) {
        eprintln!("Failed to write {}: {}", args[2], e);
        process::exit(3);
    }
}
