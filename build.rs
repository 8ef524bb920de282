fn main() {
    // Only embed Windows resources on Windows targets
    #[cfg(target_os = "windows")]
    {
        let mut res = winres::WindowsResource::new();
        res.set("FileDescription", "colsieve column pruning tool");
        res.set("ProductName", "colsieve");

        if let Err(e) = res.compile() {
            eprintln!("Warning: Failed to compile Windows resources: {}", e);
        }
    }
}
