fn main() -> std::io::Result<()> {
    fairaudit_lib::run()
}
