use argh::FromArgs;
use itertools::Itertools;

use cfgrec::earley::Earley;
use cfgrec::lr1::Lr1;
use cfgrec::scenarios::scenarios;

#[derive(FromArgs)]
/// Run the built-in regression scenarios
#[argh(subcommand, name = "suite")]
pub struct RunSuite {
    /// only run scenarios whose name contains this substring
    #[argh(option, short = 'f')]
    filter: Option<String>,

    /// which engine(s) to exercise
    #[argh(option, short = 'e', default = "SuiteEngine::Both")]
    engine: SuiteEngine,
}

#[derive(Debug, Clone, Copy)]
enum SuiteEngine {
    Earley,
    Lr1,
    Both,
}

impl std::str::FromStr for SuiteEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earley" => Ok(Self::Earley),
            "lr1" => Ok(Self::Lr1),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown engine '{other}', expected 'earley', 'lr1', or 'both'"
            )),
        }
    }
}

impl RunSuite {
    pub fn run(self) {
        let run_earley = matches!(self.engine, SuiteEngine::Earley | SuiteEngine::Both);
        let run_lr1 = matches!(self.engine, SuiteEngine::Lr1 | SuiteEngine::Both);

        let mut total = 0;
        let mut failed = 0;

        for scenario in scenarios() {
            if let Some(filter) = &self.filter {
                if !scenario.name.contains(filter.as_str()) {
                    continue;
                }
            }

            let grammar = (scenario.build)();

            if run_earley {
                total += 1;
                let fitted = Earley::fit(&grammar);
                let mismatches = scenario
                    .cases
                    .iter()
                    .filter(|&&(word, expected)| fitted.predict(word) != expected)
                    .map(|&(word, expected)| format!("{word:?}->{expected}"))
                    .join(", ");
                if mismatches.is_empty() {
                    println!("ok   earley  {}", scenario.name);
                } else {
                    failed += 1;
                    println!("FAIL earley  {} (mismatches: {mismatches})", scenario.name);
                }
            }

            if run_lr1 {
                total += 1;
                match Lr1::fit(&grammar) {
                    Err(e) => {
                        if scenario.expect_lr1_conflict {
                            println!("ok   lr1     {} (fit rejected: {e})", scenario.name);
                        } else {
                            failed += 1;
                            println!("FAIL lr1     {} (unexpected fit failure: {e})", scenario.name);
                        }
                    }
                    Ok(fitted) => {
                        if scenario.expect_lr1_conflict {
                            failed += 1;
                            println!("FAIL lr1     {} (fit unexpectedly succeeded)", scenario.name);
                        } else {
                            let mismatches = scenario
                                .cases
                                .iter()
                                .filter(|&&(word, expected)| fitted.predict(word) != expected)
                                .map(|&(word, expected)| format!("{word:?}->{expected}"))
                                .join(", ");
                            if mismatches.is_empty() {
                                println!("ok   lr1     {}", scenario.name);
                            } else {
                                failed += 1;
                                println!("FAIL lr1     {} (mismatches: {mismatches})", scenario.name);
                            }
                        }
                    }
                }
            }
        }

        println!("{}/{} scenarios passed", total - failed, total);
        if failed > 0 {
            std::process::exit(1);
        }
    }
}
