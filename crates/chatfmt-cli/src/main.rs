use std::collections::HashSet;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use chatfmt_core::{FormatOptions, Formatter};
use chatfmt_renderer::{Renderer, Theme};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let mut input: Option<String> = None;
    let mut options = FormatOptions::default();
    let mut users: HashSet<String> = HashSet::new();
    let mut users_files: Vec<String> = Vec::new();
    let mut mention_keys: Vec<String> = Vec::new();
    let mut raw = false;
    let mut inline_js = false;
    let mut assets_dir: Option<PathBuf> = None;
    let mut theme = Theme::Auto;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--no-markdown" => options.markdown = false,
            "--singleline" => options.singleline = true,
            "--no-mention-highlight" => options.mention_highlight = false,
            "--raw" => raw = true,
            "--js" => inline_js = true,
            "--search" => options.search_term = Some(expect_value(&mut args, "--search")),
            "--user" => {
                users.insert(expect_value(&mut args, "--user").to_lowercase());
            }
            "--users-file" => users_files.push(expect_value(&mut args, "--users-file")),
            "--mention-key" => mention_keys.push(expect_value(&mut args, "--mention-key")),
            "--assets" => assets_dir = Some(PathBuf::from(expect_value(&mut args, "--assets"))),
            "--theme" => {
                theme = match args.next().as_deref() {
                    Some("auto") => Theme::Auto,
                    Some("light") => Theme::Light,
                    Some("dark") => Theme::Dark,
                    _ => {
                        eprintln!("--theme expects: auto | light | dark");
                        print_usage();
                        process::exit(2);
                    }
                };
            }
            _ => {
                if input.is_none() && !arg.starts_with("--") {
                    input = Some(arg);
                } else {
                    eprintln!("unexpected argument: {}", arg);
                    print_usage();
                    process::exit(2);
                }
            }
        }
    }

    for path in &users_files {
        let contents = fs::read_to_string(path).unwrap_or_else(|err| {
            eprintln!("failed to read {}: {}", path, err);
            process::exit(1);
        });
        users.extend(parse_users(&contents));
    }
    debug!(users = users.len(), keys = mention_keys.len(), "loaded directory");

    let source = match input {
        Some(path) => fs::read_to_string(&path).unwrap_or_else(|err| {
            eprintln!("failed to read {}: {}", path, err);
            process::exit(1);
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .unwrap_or_else(|err| {
                    eprintln!("failed to read stdin: {}", err);
                    process::exit(1);
                });
            buffer
        }
    };

    let formatter = Formatter::builder()
        .users(&users)
        .mention_keys(&mention_keys)
        .build()
        .unwrap_or_else(|err| {
            eprintln!("{}", err);
            process::exit(1);
        });
    let fragment = formatter.format_text(source.trim_end_matches('\n'), &options);

    if raw {
        println!("{}", fragment);
        return;
    }

    let renderer = Renderer::new(theme);
    if let Some(dir) = &assets_dir {
        if let Err(err) = renderer.generate_files(dir) {
            eprintln!("failed to write assets to {}: {}", dir.display(), err);
            process::exit(1);
        }
        info!(dir = %dir.display(), "wrote stylesheet and script");
    }
    let highlighted = renderer.highlight_html(&fragment);
    print!("{}", renderer.embed_html(&highlighted, true, inline_js));
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str) -> String {
    match args.next() {
        Some(value) => value,
        None => {
            eprintln!("{} expects a value", flag);
            print_usage();
            process::exit(2);
        }
    }
}

fn parse_users(contents: &str) -> impl Iterator<Item = String> + '_ {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.trim_start_matches('@').to_lowercase())
}

fn print_usage() {
    eprintln!(
        "Usage: chatfmt-cli [--no-markdown] [--singleline] [--no-mention-highlight] \
         [--search TERM] [--user NAME]... [--users-file PATH]... [--mention-key KEY]... \
         [--raw] [--js] [--assets DIR] [--theme auto|light|dark] [input]"
    );
}
