fn main() {
    gentx::main();
}
