/// Default multiplier for `auto` concurrency, conservative for mixed I/O workloads
/// (4 cores * 50 = 200 concurrent stages)
pub const DEFAULT_CPU_MULTIPLIER: usize = 50;
/// Parallelism assumed when the host cannot report it
pub const FALLBACK_PARALLELISM: usize = 4;
/// Default in-flight byte bound for a channel between two stages (32 KiB)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32 * 1024;
/// Read buffer size used when relaying bytes across a pipeline boundary
pub const RELAY_BUFFER_SIZE: usize = 32 * 1024;
