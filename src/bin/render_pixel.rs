use restir_di::core::pixel_buffers::SampleStatus;
use restir_di::core::scene_loader::load_scene_from_file;
use restir_di::math::spectrum::RGBSpectrum;
use restir_di::renderers::progressive::ProgressiveRenderer;
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <scene.xml> <x> <y> [--spp N] [--m-area N] [--m-bsdf N] [--seed N]", args[0]);
        std::process::exit(1);
    }

    let scene_path = &args[1];
    let x: usize = args[2].parse().unwrap_or(0);
    let y: usize = args[3].parse().unwrap_or(0);

    let mut spp: u64 = 64;
    let mut m_area: Option<i64> = None;
    let mut m_bsdf: Option<i64> = None;
    let mut seed: Option<u64> = None;

    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--spp" => {
                i += 1;
                spp = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(spp);
            }
            "--m-area" => {
                i += 1;
                m_area = args.get(i).and_then(|v| v.parse::<i64>().ok());
            }
            "--m-bsdf" => {
                i += 1;
                m_bsdf = args.get(i).and_then(|v| v.parse::<i64>().ok());
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|v| v.parse::<u64>().ok());
            }
            _ => {}
        }
        i += 1;
    }

    let description = load_scene_from_file(scene_path)
        .unwrap_or_else(|e| panic!("failed to load scene: {}", e));
    let mut settings = description.settings;
    if let Some(seed) = seed {
        settings.seed = seed;
    }
    if x >= settings.width || y >= settings.height {
        eprintln!("Pixel out of bounds: ({}, {}) for size {}x{}", x, y, settings.width, settings.height);
        std::process::exit(2);
    }

    let mut renderer = ProgressiveRenderer::new(description.scene, description.sensor, settings)
        .unwrap_or_else(|e| panic!("invalid settings: {}", e));
    let m_area = m_area.unwrap_or(renderer.settings().m_area as i64);
    let m_bsdf = m_bsdf.unwrap_or(renderer.settings().m_bsdf as i64);
    renderer.set_candidate_counts(m_area, m_bsdf)
        .unwrap_or_else(|e| panic!("invalid candidate counts: {}", e));

    let mut accum = RGBSpectrum::default();
    let mut valid = 0u64;
    let mut last = None;
    for sample_index in 1..=spp {
        let (record, radiance) = renderer.trace_pixel(x, y, sample_index);
        if record.status == SampleStatus::Valid {
            valid += 1;
        }
        accum += radiance.sanitized().0;
        last = Some(record);
    }

    let avg = accum / spp.max(1) as f32;
    println!(
        "pixel ({}, {}) spp={} m_area={} m_bsdf={} valid={} -> R {:.6}, G {:.6}, B {:.6}",
        x, y, spp, m_area, m_bsdf, valid, avg[0], avg[1], avg[2]
    );
    if let Some(record) = last {
        println!("last record: {:?}", record);
    }
}
