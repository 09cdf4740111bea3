pub fn main() -> std::process::ExitCode {
    hltrate::init::run()
}
