fn main() -> Result<(), Box<dyn std::error::Error>> {
    wxprep::app::run_prepare_dataset(std::env::args().skip(1))
}
