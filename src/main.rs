fn main() -> Result<(), Box<dyn std::error::Error>> {
    marquee::runtime::run()
}
