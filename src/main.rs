//! Voiceover - speech payload to WAV converter

use clap::Parser;
use log::{debug, info};
use std::path::Path;
use std::process;
use voiceover::{init_logging, Args, Config, Result, VoiceoverError, VoiceoverPipeline, WavHeader};

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if args.write_default_config.is_some() || args.info.is_some() {
        init_logging(args.verbose);
        log_version();
    }

    if let Some(path) = &args.write_default_config {
        Config::create_default_config(path)?;
        println!("Wrote default config: {}", path.display());
        return Ok(());
    }

    if let Some(path) = &args.info {
        return print_info(path);
    }

    let config = Config::from_args_and_config(args)?;
    init_logging(config.verbose());
    log_version();

    if !config.processing.overwrite && config.output_path.exists() {
        return Err(VoiceoverError::config(format!(
            "Output file already exists: {}", config.output_path.display()
        )));
    }

    let pipeline = VoiceoverPipeline::from_config(&config)?;
    info!(
        "Converting {} -> {} ({} Hz, {} channel(s), {} decoder)",
        config.input_path.display(),
        config.output_path.display(),
        config.audio.sample_rate,
        config.audio.channels,
        pipeline.decoder_name()
    );

    let result = pipeline.process_file(&config.input_path, &config.output_path)?;

    println!(
        "Wrote {}: {} frames, {:.2}s, {} bytes",
        result.output_path.display(),
        result.frames,
        result.duration_seconds,
        result.output_bytes
    );
    debug!("Time: {:.3}s", result.processing_time_seconds);

    Ok(())
}

fn log_version() {
    debug!("{} v{} - {}", voiceover::NAME, voiceover::VERSION, voiceover::DESCRIPTION);
}

fn print_info(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path)?;
    let header = WavHeader::parse(&bytes)?;

    println!("File: {}", path.display());
    println!("Sample rate: {} Hz", header.sample_rate);
    println!("Channels: {}", header.channels);
    println!("Bits per sample: 16");
    println!("Frames: {}", header.num_frames());
    println!("Duration: {:.2}s", header.duration_secs());
    println!("Data size: {} bytes", header.data_size);

    if bytes.len() != header.file_size() {
        println!(
            "Warning: file is {} bytes, header describes {}",
            bytes.len(),
            header.file_size()
        );
    }

    Ok(())
}
