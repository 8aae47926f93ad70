//! Configuration management for payload conversion

use crate::audio::{HoundPcmDecoder, PcmDecoder, PcmFormat, SoftwarePcmDecoder};
use crate::error::{VoiceoverError, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MAX_SAMPLE_RATE: u32 = 192000;
pub const MAX_CHANNELS: u16 = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub audio: AudioConfig,
    pub decoder: DecoderConfig,
    pub processing: ProcessingConfig,
}

/// Format of the incoming raw PCM.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub backend: DecoderBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub overwrite: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DecoderBackend {
    #[default]
    Software,
    Hound,
}

impl DecoderBackend {
    pub fn create_decoder(self) -> Box<dyn PcmDecoder> {
        match self {
            DecoderBackend::Software => Box::new(SoftwarePcmDecoder),
            DecoderBackend::Hound => Box::new(HoundPcmDecoder),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("-"),
            output_path: PathBuf::from("voiceover.wav"),
            audio: AudioConfig::default(),
            decoder: DecoderConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: PcmFormat::SPEECH.sample_rate,
            channels: PcmFormat::SPEECH.channels,
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            backend: DecoderBackend::Software,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            overwrite: true,
            verbose: false,
        }
    }
}

impl Config {
    pub fn pcm_format(&self) -> PcmFormat {
        PcmFormat::new(self.audio.sample_rate, self.audio.channels)
    }

    pub fn verbose(&self) -> bool {
        self.processing.verbose
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "voiceover", about = "Speech payload to WAV converter", version, author)]
pub struct Args {
    #[arg(
        short = 'i',
        long = "input",
        required_unless_present_any = ["info", "write_default_config"],
        help = "File holding the base64 PCM payload, '-' for stdin"
    )]
    pub input: Option<PathBuf>,

    #[arg(short = 'o', long = "output", help = "Output WAV file path [default: voiceover.wav]")]
    pub output: Option<PathBuf>,

    #[arg(short = 'r', long = "sample-rate", help = "Payload sample rate (Hz) [default: 24000]")]
    pub sample_rate: Option<u32>,

    #[arg(long = "channels", help = "Payload channel count [default: 1]")]
    pub channels: Option<u16>,

    #[arg(long = "decoder", value_enum, help = "PCM decoder backend [default: software]")]
    pub decoder: Option<DecoderBackend>,

    #[arg(short = 'c', long = "config", help = "Config file path (TOML format)")]
    pub config_file: Option<PathBuf>,

    #[arg(long = "write-default-config", help = "Write the default config to this path and exit")]
    pub write_default_config: Option<PathBuf>,

    #[arg(long = "info", help = "Print the header of an existing WAV file and exit")]
    pub info: Option<PathBuf>,

    #[arg(long = "no-overwrite", help = "Refuse to replace an existing output file")]
    pub no_overwrite: bool,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output mode")]
    pub verbose: bool,
}

impl Config {
    /// Create config from command line arguments and config file
    pub fn from_args_and_config(args: Args) -> Result<Self> {
        let mut config = if let Some(config_path) = &args.config_file {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        // Flags given on the command line win over the config file
        if let Some(input) = args.input {
            config.input_path = input;
        }
        if let Some(output) = args.output {
            config.output_path = output;
        }
        if let Some(sample_rate) = args.sample_rate {
            config.audio.sample_rate = sample_rate;
        }
        if let Some(channels) = args.channels {
            config.audio.channels = channels;
        }
        if let Some(backend) = args.decoder {
            config.decoder.backend = backend;
        }
        if args.no_overwrite {
            config.processing.overwrite = false;
        }
        if args.verbose {
            config.processing.verbose = true;
        }

        config.validate()?;

        Ok(config)
    }

    /// Load config from TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VoiceoverError::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| VoiceoverError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Validate configuration parameter validity
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(VoiceoverError::config("Sample rate must be greater than 0"));
        }
        if self.audio.sample_rate > MAX_SAMPLE_RATE {
            return Err(VoiceoverError::config(format!(
                "Sample rate cannot exceed {} Hz", MAX_SAMPLE_RATE
            )));
        }

        if self.audio.channels == 0 {
            return Err(VoiceoverError::config("Channel count must be at least 1"));
        }
        if self.audio.channels > MAX_CHANNELS {
            return Err(VoiceoverError::config(format!(
                "Channel count cannot exceed {}", MAX_CHANNELS
            )));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(VoiceoverError::config("Output path cannot be empty"));
        }

        Ok(())
    }

    /// Save config to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VoiceoverError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| VoiceoverError::config(format!("Failed to write config file: {}", e)))
    }

    /// Create default config file
    pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let default_config = Self::default();
        default_config.save_to_file(path)
    }
}
