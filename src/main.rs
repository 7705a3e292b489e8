use trade_perf::error::AppResult;

fn main() -> AppResult<()> {
    trade_perf::run()
}
