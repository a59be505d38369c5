use gauge::{Gauge, GaugeConfig, Renderer, ViewerOptions};
use rand::Rng;
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufWriter};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

const USAGE: &str = "\
usage: gauge [options]

  --config FILE      load a JSON gauge configuration
  --range MIN MAX    override the gauge domain
  --value V          initial value (default: domain minimum)
  --title TITLE      window title
  --font FILE        TTF/OTF font used for tick and value labels
  --json             print the laid-out scene as JSON and exit
  --png FILE         render the scene to a PNG file and exit
  --size N           PNG size in pixels (default 600)
  --demo             drive the needle with a random walk instead of stdin

Without --demo, one number per line on stdin updates the gauge.";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    range: Option<(f64, f64)>,
    value: Option<f64>,
    title: Option<String>,
    font: Option<PathBuf>,
    json: bool,
    png: Option<PathBuf>,
    size: Option<u32>,
    demo: bool,
}

fn parse_number<T: std::str::FromStr>(flag: &str, arg: Option<String>) -> Result<T, String> {
    let arg = arg.ok_or_else(|| format!("{flag} needs a value"))?;
    arg.parse()
        .map_err(|_| format!("{flag}: {arg:?} is not a valid number"))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => parsed.config = Some(args.next().ok_or("--config needs a file")?.into()),
            "--range" => {
                let min = parse_number("--range", args.next())?;
                let max = parse_number("--range", args.next())?;
                parsed.range = Some((min, max));
            }
            "--value" => parsed.value = Some(parse_number("--value", args.next())?),
            "--title" => parsed.title = Some(args.next().ok_or("--title needs a value")?),
            "--font" => parsed.font = Some(args.next().ok_or("--font needs a file")?.into()),
            "--json" => parsed.json = true,
            "--png" => parsed.png = Some(args.next().ok_or("--png needs a file")?.into()),
            "--size" => parsed.size = Some(parse_number("--size", args.next())?),
            "--demo" => parsed.demo = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument {other:?}\n\n{USAGE}")),
        }
    }
    Ok(parsed)
}

fn load_config(args: &Args) -> Result<GaugeConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("loading configuration from {}", path.display());
            GaugeConfig::from_json(&std::fs::read_to_string(path)?)?
        }
        None => GaugeConfig::default(),
    };
    if let Some((min, max)) = args.range {
        config.min_value = min;
        config.max_value = max;
    }
    Ok(config)
}

fn spawn_stdin_reader(sender: Sender<f64>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<f64>() {
                Ok(value) => {
                    if sender.send(value).is_err() {
                        break;
                    }
                }
                Err(_) => log::warn!("ignoring non-numeric input {line:?}"),
            }
        }
    });
}

/// Wander towards a new random target now and then, easing in like a real needle.
fn spawn_random_walk(sender: Sender<f64>, min: f64, max: f64) {
    const LERP_FACTOR: f64 = 0.1;
    thread::spawn(move || {
        let mut rng = rand::rng();
        let mut value = (min + max) / 2.0;
        let mut target = value;
        loop {
            if rng.random_range(0.0..1.0) < 0.02 {
                target = rng.random_range(min..=max);
            }
            value += (target - value) * LERP_FACTOR;
            if sender.send(value).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(16));
        }
    });
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args(env::args().skip(1))?;
    let config = load_config(&args)?;
    let initial = args.value.unwrap_or(config.min_value);
    let gauge = Gauge::new(config, initial)?;

    if args.json {
        println!("{}", gauge.layout()?.to_json()?);
        return Ok(());
    }

    let mut renderer = Renderer::new();
    if let Some(path) = &args.font {
        renderer = renderer.with_font_file(path)?;
    }

    if let Some(path) = &args.png {
        let size = args.size.unwrap_or(600);
        let file = BufWriter::new(File::create(path)?);
        renderer.write_png(file, &gauge.layout()?, size, size)?;
        log::info!("wrote {}x{} gauge to {}", size, size, path.display());
        return Ok(());
    }

    let (sender, receiver) = mpsc::channel();
    if args.demo {
        let domain = gauge.mapping().domain;
        spawn_random_walk(sender, domain.min(), domain.max());
    } else {
        spawn_stdin_reader(sender);
    }

    let options = ViewerOptions::builder()
        .title(args.title.unwrap_or_else(|| "Gauge".to_string()))
        .build();
    gauge.show_with_values(renderer, options, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge::GaugeError;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn inverted_range_is_rejected_not_swapped() {
        let parsed = args(&["--range", "100", "0", "--json"]).unwrap();
        assert_eq!(parsed.range, Some((100.0, 0.0)));

        let config = load_config(&parsed).unwrap();
        assert_eq!(
            Gauge::new(config, 50.0).unwrap_err(),
            GaugeError::InvalidDomain { min: 100.0, max: 0.0 }
        );
    }

    #[test]
    fn range_overrides_default_domain() {
        let parsed = args(&["--range", "-20", "80", "--value", "10"]).unwrap();
        let config = load_config(&parsed).unwrap();
        assert_eq!((config.min_value, config.max_value), (-20.0, 80.0));
        assert_eq!(parsed.value, Some(10.0));
    }

    #[test]
    fn malformed_arguments_are_reported() {
        assert!(args(&["--range", "1"]).is_err());
        assert!(args(&["--size", "big"]).is_err());
        assert!(args(&["--bogus"]).is_err());
    }
}
