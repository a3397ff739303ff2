use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process;

use argh::FromArgs;

use cfgrec::driver::{self, Engine};

#[derive(FromArgs)]
/// Read a grammar-and-queries file and report Yes/No per query
#[argh(subcommand, name = "recognize")]
pub struct Recognize {
    /// grammar-and-queries file (stdin if omitted)
    #[argh(option, short = 'g')]
    grammar: Option<OsString>,

    /// recognizer engine to use
    #[argh(option, short = 'e', default = "EngineArg::Earley")]
    engine: EngineArg,
}

#[derive(Debug, Clone, Copy)]
enum EngineArg {
    Earley,
    Lr1,
}

impl std::str::FromStr for EngineArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earley" => Ok(Self::Earley),
            "lr1" => Ok(Self::Lr1),
            other => Err(format!("unknown engine '{other}', expected 'earley' or 'lr1'")),
        }
    }
}

impl From<EngineArg> for Engine {
    fn from(value: EngineArg) -> Self {
        match value {
            EngineArg::Earley => Engine::Earley,
            EngineArg::Lr1 => Engine::Lr1,
        }
    }
}

impl Recognize {
    pub fn run(self) {
        let stdout = io::stdout();
        let result = match &self.grammar {
            Some(path) => {
                let file = match File::open(path) {
                    Ok(f) => f,
                    Err(e) => {
                        eprintln!("cannot open '{}': {e}", path.to_string_lossy());
                        process::exit(1);
                    }
                };
                driver::run(BufReader::new(file), stdout.lock(), self.engine.into())
            }
            None => driver::run(BufReader::new(io::stdin()), stdout.lock(), self.engine.into()),
        };

        if let Err(e) = result {
            let _ = io::stdout().flush();
            eprintln!("{e}");
            process::exit(1);
        }
    }
}
