use anyhow::Result;
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use genablog::blog::Blog;
use genablog::build::build_site;
use std::path::Path;

fn main() -> Result<()> {
    let matches = App::new("genablog")
        .version(crate_version!())
        .about("Generates a static blog from a directory of entries")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Logs every file written"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Writes the blog into a new directory under `out/`")
                .arg(blog_arg()),
        )
        .subcommand(
            SubCommand::with_name("show")
                .about("Prints what was read from the blog's sources")
                .arg(blog_arg()),
        )
        .get_matches();

    init_logger(matches.is_present("verbose"));

    match matches.subcommand() {
        ("build", Some(matches)) => build(matches),
        ("show", Some(matches)) => show(matches),
        _ => Ok(()),
    }
}

fn blog_arg() -> Arg<'static, 'static> {
    Arg::with_name("BLOG")
        .help("The blog's root directory (containing `in/`)")
        .required(true)
        .index(1)
}

fn blog_location<'a>(matches: &'a ArgMatches) -> &'a Path {
    // required argument
    Path::new(matches.value_of("BLOG").unwrap_or_default().trim())
}

fn build(matches: &ArgMatches) -> Result<()> {
    let run_directory = build_site(blog_location(matches))?;
    println!("{}", run_directory.display());
    Ok(())
}

fn show(matches: &ArgMatches) -> Result<()> {
    let mut blog = Blog::open(blog_location(matches))?;
    blog.read_all()?;
    print!("{}", blog);
    Ok(())
}

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
