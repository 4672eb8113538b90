fn main() {
    iy_cli::init_logging();
    std::process::exit(iy_cli::run_cli_from_args(std::env::args_os()));
}
