extern crate clap;
extern crate env_logger;
extern crate image;
extern crate itertools;
extern crate newtonbrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use itertools::Itertools;
use newtonbrot::{Complex, ComplexRootedPolynomial, NewtonSampler, ParallelFractalEngine, Viewport};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Given a string and a separator, returns the two values separated by
/// the separator.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// A viewport corner given as a comma-separated re,im pair.
fn parse_corner(s: &str) -> Option<Complex> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex::new(re, im)),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const WORKERS: &str = "workers";
const TRACKS: &str = "tracks";

fn args<'a>() -> ArgMatches<'a> {
    App::new("newton")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Newton-Raphson fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .default_value("-2,-2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the rendered window"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .default_value("2,2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the rendered window"),
        )
        .arg(
            Arg::with_name(WORKERS)
                .required(false)
                .long(WORKERS)
                .short("w")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        std::usize::MAX,
                        "Could not parse worker count",
                        "Worker count must be positive",
                    )
                })
                .help("Number of worker threads (default: all cores)"),
        )
        .arg(
            Arg::with_name(TRACKS)
                .required(false)
                .long(TRACKS)
                .short("t")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        std::usize::MAX,
                        "Could not parse track count",
                        "Track count must be positive",
                    )
                })
                .help("Number of row bands to split the image into (default: 4x cores)"),
        )
        .get_matches()
}

/// Read roots from standard input, one per line, until the line "done"
/// or end of input.  A malformed line is fatal for the run.
fn read_roots() -> Vec<Complex> {
    let mut roots = Vec::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Root {}> ", roots.len() + 1);
        io::stdout().flush().expect("cannot flush standard output");
        let line = match lines.next() {
            Some(line) => line.expect("cannot read standard input"),
            None => break,
        };
        let line = line.trim();
        if line == "done" {
            break;
        }
        match line.parse::<Complex>() {
            Ok(root) => roots.push(root),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }
    roots
}

fn mod2(val: f64) -> f64 {
    (val / 2.0).fract() * 2.0
}

/// An RGB color at full saturation and value for the given hue in
/// degrees.
fn hue_rgb(hue: f64) -> [u8; 3] {
    let x = (255.0 * (1.0 - (mod2(hue / 60.0) - 1.0).abs())) as u8;
    if hue < 60.0 {
        [255, x, 0]
    } else if hue < 120.0 {
        [x, 255, 0]
    } else if hue < 180.0 {
        [0, 255, x]
    } else if hue < 240.0 {
        [0, x, 255]
    } else if hue < 300.0 {
        [x, 0, 255]
    } else {
        [255, 0, x]
    }
}

/// Map classification indices onto evenly spaced hues.  Index 0, the
/// points that never settled on a root, stays black.
fn colorize(data: &[i16], num_colors: i16) -> Vec<u8> {
    let hues = i32::from(num_colors) - 1;
    let palette: Vec<[u8; 3]> = (0..hues)
        .map(|at| hue_rgb(360.0 * f64::from(at) / f64::from(hues)))
        .collect();
    let mut pixels = Vec::with_capacity(data.len() * 3);
    for &index in data {
        if index == 0 {
            pixels.extend_from_slice(&[0, 0, 0]);
        } else {
            pixels.extend_from_slice(&palette[(index - 1) as usize]);
        }
    }
    pixels
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<(), std::io::Error> {
    let path = Path::new(outfile);
    let output = File::create(&path)?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::RGB(8))?;
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();

    let image_size =
        parse_pair(matches.value_of(SIZE).unwrap(), 'x').expect("Error parsing image dimensions");
    let leftlower =
        parse_corner(matches.value_of(LEFTLOWER).unwrap()).expect("Error parsing left lower point");
    let rightupper = parse_corner(matches.value_of(RIGHTUPPER).unwrap())
        .expect("Error parsing right upper point");
    let workers = match matches.value_of(WORKERS) {
        Some(s) => usize::from_str(s).expect("validated by clap"),
        None => num_cpus::get(),
    };
    let tracks = match matches.value_of(TRACKS) {
        Some(s) => usize::from_str(s).expect("validated by clap"),
        None => 4 * num_cpus::get(),
    };

    println!("Welcome to Newton-Raphson iteration-based fractal viewer.");
    println!("Please enter at least two roots, one root per line. Enter 'done' when done.");
    let roots = read_roots();
    if roots.len() < 2 {
        eprintln!("At least two roots are required.");
        std::process::exit(1);
    }
    println!(
        "Rendering the fractal of {} roots: {}.",
        roots.len(),
        roots.iter().join(", ")
    );
    println!("Number of workers: {}", workers);
    println!("Number of tracks: {}", tracks);

    let sampler = Arc::new(NewtonSampler::new(ComplexRootedPolynomial::new(
        Complex::ONE,
        roots,
    )));
    let engine = match ParallelFractalEngine::new(workers, tracks) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let viewport = Viewport::new(
        leftlower.re,
        rightupper.re,
        leftlower.im,
        rightupper.im,
        image_size.0,
        image_size.1,
    );
    let mut data = vec![0i16; viewport.len()];
    let cancel = Arc::new(AtomicBool::new(false));
    let completion = engine
        .compute(&sampler, viewport, &mut data, 1, &cancel)
        .expect("the request is never cancelled");

    let pixels = colorize(&data, completion.num_colors);
    let outfile = matches.value_of(OUTPUT).unwrap();
    if let Err(e) = write_image(outfile, &pixels, (viewport.width, viewport.height)) {
        eprintln!("Could not write the image: {}", e);
        std::process::exit(1);
    }
    println!("Fractal written to {}.", outfile);
}
