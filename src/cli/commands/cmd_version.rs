use clap::Args;
use clap::crate_version;

#[derive(Args, Debug)]
pub struct VersionCommand;

pub fn execute(_: &VersionCommand) {
    println!("STRATA version: {}", crate_version!());
}
