use argh::FromArgs;

mod cmd_recognize;
mod cmd_suite;

#[derive(FromArgs)]
/// Context-free grammar membership recognizer (Earley and LR(1))
struct Args {
    #[argh(subcommand)]
    subcommand: Subcommand,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Subcommand {
    Recognize(cmd_recognize::Recognize),
    Suite(cmd_suite::RunSuite),
}

impl Subcommand {
    fn run(self) {
        match self {
            Subcommand::Recognize(cmd) => cmd.run(),
            Subcommand::Suite(cmd) => cmd.run(),
        }
    }
}

fn main() {
    env_logger::init();
    argh::from_env::<Args>().subcommand.run();
}
