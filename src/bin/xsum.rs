/// xsum – CLI for the cross-sum block codec.
///
/// Works similar to gzip / zstd:
///   xsum file.bin          → encode to file.bin.xs (removes original)
///   xsum -d file.bin.xs    → decode to file.bin (removes original)
///   xsum -c file.bin       → encode to stdout
///   xsum -k file.bin       → keep original after encoding
///   xsum -l file.bin.xs    → list info about an encoded file
///   cat file | xsum -c     → encode stdin to stdout
///   cat file | xsum -dc    → decode stdin to stdout
use std::env;
use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};

use xsum::config::{Config, DEFAULT_SIZE};
use xsum::decoder;
use xsum::encoder;
use xsum::serializer::{Header, HEADER_SIZE};

fn usage() {
    eprintln!("xsum - cross-sum block codec");
    eprintln!();
    eprintln!("Usage: xsum [OPTIONS] [FILE]...");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -d, --decompress   Decode mode");
    eprintln!("  -c, --stdout       Write to stdout (don't remove original)");
    eprintln!("  -k, --keep         Keep original file");
    eprintln!("  -f, --force        Overwrite existing output files");
    eprintln!("  -l, --list         List info about encoded file");
    eprintln!("  -s, --size N       Block dimension in bits (default: {DEFAULT_SIZE})");
    eprintln!("  -q, --quiet        Suppress warnings");
    eprintln!("  -v, --verbose      Verbose output");
    eprintln!("  -h, --help         Show this help");
    eprintln!();
    eprintln!("If no FILE is given, reads from stdin and writes to stdout.");
    eprintln!("Encoded files use the .xs extension.");
    eprintln!("Encoder and decoder must agree on -s; it is not stored in the stream.");
}

#[derive(Debug)]
struct Opts {
    decode: bool,
    to_stdout: bool,
    keep: bool,
    force: bool,
    list: bool,
    verbose: bool,
    quiet: bool,
    size: usize,
    files: Vec<String>,
}

fn parse_args() -> Opts {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut opts = Opts {
        decode: false,
        to_stdout: false,
        keep: false,
        force: false,
        list: false,
        verbose: false,
        quiet: false,
        size: DEFAULT_SIZE,
        files: Vec::new(),
    };

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-d" | "--decompress" | "--decode" => opts.decode = true,
            "-c" | "--stdout" | "--to-stdout" => opts.to_stdout = true,
            "-k" | "--keep" => opts.keep = true,
            "-f" | "--force" => opts.force = true,
            "-l" | "--list" => opts.list = true,
            "-v" | "--verbose" => opts.verbose = true,
            "-q" | "--quiet" => opts.quiet = true,
            "-h" | "--help" => {
                usage();
                process::exit(0);
            }
            "-s" | "--size" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("xsum: missing argument for -s");
                    process::exit(1);
                }
                opts.size = match args[i].parse::<usize>() {
                    Ok(n) => n,
                    Err(_) => {
                        eprintln!("xsum: invalid size '{}'", args[i]);
                        process::exit(1);
                    }
                };
            }
            // Handle combined short flags like -dc, -kv, etc.
            s if s.starts_with('-') && !s.starts_with("--") && s.len() > 2 => {
                for ch in s[1..].chars() {
                    match ch {
                        'd' => opts.decode = true,
                        'c' => opts.to_stdout = true,
                        'k' => opts.keep = true,
                        'f' => opts.force = true,
                        'l' => opts.list = true,
                        'v' => opts.verbose = true,
                        'q' => opts.quiet = true,
                        _ => {
                            eprintln!("xsum: unknown flag '-{ch}'");
                            process::exit(1);
                        }
                    }
                }
            }
            _ => {
                opts.files.push(arg.clone());
            }
        }
        i += 1;
    }

    opts
}

/// Output filename for encoding.
fn encode_output_path(input: &str) -> PathBuf {
    PathBuf::from(format!("{input}.xs"))
}

/// Output filename for decoding; `None` for an unrecognized suffix.
fn decode_output_path(input: &str) -> Option<PathBuf> {
    let path = Path::new(input);
    match path.extension().and_then(|e| e.to_str()) {
        Some("xs") => Some(path.with_extension("")),
        _ => None,
    }
}

fn list_file(path: &str, data: &[u8]) -> Result<(), String> {
    let header = Header::parse(data).map_err(|e| format!("{path}: {e}"))?;
    let ratio = if header.original_size > 0 {
        (data.len() as f64 / header.original_size as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "{:>12} {:>12} {:6.1}% {:>7} {}",
        header.original_size,
        data.len(),
        ratio,
        header.block_count,
        path,
    );
    Ok(())
}

fn process_encode(opts: &Opts, path: &str, config: Config) -> Result<(), String> {
    let file = fs::File::open(path).map_err(|e| format!("{path}: {e}"))?;
    let original_size = file
        .metadata()
        .map_err(|e| format!("{path}: {e}"))?
        .len();
    let input = BufReader::new(file);

    if opts.to_stdout {
        let mut output = BufWriter::new(io::stdout().lock());
        encoder::encode_stream(input, &mut output, config, original_size)
            .map_err(|e| format!("{path}: {e}"))?;
        output.flush().map_err(|e| format!("stdout: {e}"))?;
    } else {
        let out_path = encode_output_path(path);
        let out_str = out_path.display().to_string();

        if out_path.exists() && !opts.force {
            return Err(format!("{out_str} already exists; use -f to overwrite"));
        }

        let out_file = fs::File::create(&out_path).map_err(|e| format!("{out_str}: {e}"))?;
        let mut output = BufWriter::new(out_file);
        let written = encoder::encode_stream(input, &mut output, config, original_size)
            .map_err(|e| format!("{path}: {e}"))?;
        output.flush().map_err(|e| format!("{out_str}: {e}"))?;

        if opts.verbose {
            eprintln!("{path}: {original_size} → {written} bytes");
        }

        if !opts.keep {
            fs::remove_file(path).map_err(|e| format!("{path}: cannot remove: {e}"))?;
        }
    }

    Ok(())
}

fn process_decode(opts: &Opts, path: &str, config: Config) -> Result<(), String> {
    let file = fs::File::open(path).map_err(|e| format!("{path}: {e}"))?;
    let input = BufReader::new(file);

    if opts.to_stdout {
        let mut output = BufWriter::new(io::stdout().lock());
        decoder::decode_stream(input, &mut output, config)
            .map_err(|e| format!("{path}: {e}"))?;
        output.flush().map_err(|e| format!("stdout: {e}"))?;
    } else {
        let out_path = decode_output_path(path)
            .ok_or_else(|| format!("{path}: unknown suffix -- ignored"))?;
        let out_str = out_path.display().to_string();

        if out_path.exists() && !opts.force {
            return Err(format!("{out_str} already exists; use -f to overwrite"));
        }

        let out_file = fs::File::create(&out_path).map_err(|e| format!("{out_str}: {e}"))?;
        let mut output = BufWriter::new(out_file);
        let written = decoder::decode_stream(input, &mut output, config)
            .map_err(|e| format!("{path}: {e}"))?;
        output.flush().map_err(|e| format!("{out_str}: {e}"))?;

        if opts.verbose {
            let in_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            eprintln!("{path}: {in_size} → {written} bytes");
        }

        if !opts.keep {
            fs::remove_file(path).map_err(|e| format!("{path}: cannot remove: {e}"))?;
        }
    }

    Ok(())
}

fn process_stdin_stdout(opts: &Opts, config: Config) -> Result<(), String> {
    let stdin = io::stdin();
    let stdout = io::stdout();

    if opts.decode {
        let input = BufReader::new(stdin.lock());
        let mut output = BufWriter::new(stdout.lock());
        decoder::decode_stream(input, &mut output, config).map_err(|e| format!("stdin: {e}"))?;
        output.flush().map_err(|e| format!("stdout: {e}"))?;
    } else {
        // The header records the input length up front, so stdin has to
        // be buffered before any output byte is written.
        let mut data = Vec::new();
        stdin
            .lock()
            .read_to_end(&mut data)
            .map_err(|e| format!("stdin: {e}"))?;
        let mut output = BufWriter::new(stdout.lock());
        encoder::encode_stream(&data[..], &mut output, config, data.len() as u64)
            .map_err(|e| format!("stdin: {e}"))?;
        output.flush().map_err(|e| format!("stdout: {e}"))?;
    }

    Ok(())
}

fn run() -> Result<(), ()> {
    let opts = parse_args();
    let config = match Config::new(opts.size) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("xsum: size {}: {e}", opts.size);
            return Err(());
        }
    };
    let mut had_error = false;

    if opts.files.is_empty() {
        // stdin/stdout mode
        if opts.list {
            eprintln!("xsum: -l requires a file argument");
            return Err(());
        }
        if let Err(e) = process_stdin_stdout(&opts, config) {
            eprintln!("xsum: {e}");
            return Err(());
        }
        return Ok(());
    }

    // List mode
    if opts.list {
        println!(
            "{:>12} {:>12} {:>6} {:>8} name",
            "original", "encoded", "ratio", "blocks"
        );
        for path in &opts.files {
            match fs::read(path) {
                Ok(data) => {
                    if data.len() < HEADER_SIZE {
                        eprintln!("xsum: {path}: truncated header");
                        had_error = true;
                    } else if let Err(e) = list_file(path, &data) {
                        eprintln!("xsum: {e}");
                        had_error = true;
                    }
                }
                Err(e) => {
                    eprintln!("xsum: {path}: {e}");
                    had_error = true;
                }
            }
        }
        return if had_error { Err(()) } else { Ok(()) };
    }

    for path in &opts.files {
        let result = if path == "-" {
            process_stdin_stdout(&opts, config)
        } else if opts.decode {
            process_decode(&opts, path, config)
        } else {
            process_encode(&opts, path, config)
        };

        if let Err(e) = result {
            eprintln!("xsum: {e}");
            had_error = true;
        }
    }

    if had_error {
        Err(())
    } else {
        Ok(())
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}
