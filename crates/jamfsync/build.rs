use std::fs;
use std::path::Path;

use clap::CommandFactory;

#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR").expect("OUT_DIR not set by Cargo");
    let man_dir = Path::new(&out_dir).join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man page directory");

    let jamfsync = cli::Cli::command();
    write_page(&jamfsync, &man_dir.join("jamfsync.1"));

    // The command tree is one level deep: jamfsync-<command>.1 per command.
    for command in jamfsync.get_subcommands().filter(|c| c.get_name() != "completions") {
        let page = format!("jamfsync-{}", command.get_name());
        write_page(&command.clone().name(page.clone()), &man_dir.join(format!("{page}.1")));
    }
}

fn write_page(command: &clap::Command, path: &Path) {
    let mut roff = Vec::new();
    clap_mangen::Man::new(command.clone())
        .render(&mut roff)
        .unwrap_or_else(|e| panic!("cannot render {}: {e}", path.display()));
    fs::write(path, roff).unwrap_or_else(|e| panic!("cannot write {}: {e}", path.display()));
}
