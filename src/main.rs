fn main() {
    guardfall::game::run();
}
