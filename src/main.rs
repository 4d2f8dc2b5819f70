fn main() -> Result<(), eframe::Error> {
    // RUST_LOG=node_canvas=debug shows gesture and persistence traces
    env_logger::init();

    node_canvas::run_app()
}
