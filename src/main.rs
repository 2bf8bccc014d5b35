mod api;
mod app;
mod config;
mod mpris;
mod net;
mod player;
mod runtime;
mod storage;
mod ui;

fn main() {
    if let Err(e) = runtime::run() {
        eprintln!("vibo: {e}");
        std::process::exit(1);
    }
}
