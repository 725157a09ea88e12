//! Line-oriented network description.
//!
//! ```text
//! # comment
//! name     <free text>
//! kind     circuit|hydraulic
//! fluid    <mu Pa s> <rho kg/m3>
//! resistor <from> <to> <ohms> [name]
//! source   <from> <to> <volts> [name]
//! pipe     <from> <to> <length m> <diameter mm> <roughness m> [name]
//! head     <from> <to> <head m> [name]
//! node     <name> [demand] [reference]
//! loop     <name> <element> <element> ...
//! unknowns <count>
//! unknown  <element> <coef>:<index> [<coef>:<index> ...]
//! guess    <v0> <v1> ...
//! label    <index> <text>
//! ```
//!
//! Without a `kind` line the network is hydraulic if it has any pipe or head
//! element, a circuit otherwise.

use crate::schema::*;
use crate::{ProjectError, ProjectResult};
use lf_core::Real;

/// Parse a text description. The result is not validated.
pub fn parse(input: &str) -> ProjectResult<NetworkDef> {
    let mut def = NetworkDef {
        name: "network".to_string(),
        kind: NetworkKind::Circuit,
        fluid: None,
        nodes: Vec::new(),
        elements: Vec::new(),
        loops: Vec::new(),
        unknown_count: None,
        unknowns: Vec::new(),
        guess: None,
        labels: Vec::new(),
    };
    let mut kind = None;

    for (i, raw) in input.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut cursor = Cursor::new(line, line_no);
        let keyword = cursor.word("keyword")?;

        match keyword.to_ascii_lowercase().as_str() {
            "name" => {
                let rest = line[keyword.len()..].trim();
                if rest.is_empty() {
                    return Err(cursor.error("missing network name"));
                }
                def.name = rest.to_string();
                continue;
            }
            "kind" => {
                kind = Some(match cursor.word("network kind")? {
                    "circuit" => NetworkKind::Circuit,
                    "hydraulic" => NetworkKind::Hydraulic,
                    other => {
                        return Err(cursor.error(&format!("unknown network kind '{other}'")));
                    }
                });
            }
            "fluid" => {
                def.fluid = Some(FluidDef {
                    mu_pa_s: cursor.number("viscosity")?,
                    rho_kg_m3: cursor.number("density")?,
                });
            }
            "resistor" => {
                let (from, to) = cursor.endpoints()?;
                let ohms = cursor.number("resistance")?;
                def.elements.push(ElementDef {
                    name: cursor.optional_word(),
                    from,
                    to,
                    kind: ElementKind::Resistor { ohms },
                });
            }
            "source" => {
                let (from, to) = cursor.endpoints()?;
                let volts = cursor.number("voltage")?;
                def.elements.push(ElementDef {
                    name: cursor.optional_word(),
                    from,
                    to,
                    kind: ElementKind::Source { volts },
                });
            }
            "pipe" => {
                let (from, to) = cursor.endpoints()?;
                let length_m = cursor.number("length")?;
                let diameter_mm = cursor.number("diameter")?;
                let roughness_m = cursor.number("roughness")?;
                def.elements.push(ElementDef {
                    name: cursor.optional_word(),
                    from,
                    to,
                    kind: ElementKind::Pipe {
                        length_m,
                        diameter_mm,
                        roughness_m,
                    },
                });
            }
            "head" => {
                let (from, to) = cursor.endpoints()?;
                let head_m = cursor.number("head")?;
                def.elements.push(ElementDef {
                    name: cursor.optional_word(),
                    from,
                    to,
                    kind: ElementKind::Head { head_m },
                });
            }
            "node" => {
                let name = cursor.word("node name")?.to_string();
                let mut node = NodeDef {
                    name,
                    demand: 0.0,
                    reference: false,
                };
                let mut demand = None;
                while let Some(tok) = cursor.next_token() {
                    if tok.eq_ignore_ascii_case("reference") {
                        node.reference = true;
                    } else if demand.is_some() {
                        return Err(cursor.error(&format!(
                            "node {} has a second demand '{tok}'",
                            node.name
                        )));
                    } else {
                        demand = Some(parse_number(tok, "demand", line_no)?);
                    }
                }
                node.demand = demand.unwrap_or(0.0);
                def.nodes.push(node);
                continue;
            }
            "loop" => {
                let name = cursor.word("loop name")?.to_string();
                let elements: Vec<String> = cursor.rest().map(str::to_string).collect();
                if elements.is_empty() {
                    return Err(cursor.error(&format!("loop {name} lists no elements")));
                }
                def.loops.push(LoopDef { name, elements });
                continue;
            }
            "unknowns" => {
                let count = cursor.word("unknown count")?;
                def.unknown_count = Some(count.parse().map_err(|_| ProjectError::Parse {
                    line: line_no,
                    what: format!("invalid unknown count '{count}'"),
                })?);
            }
            "unknown" => {
                let element = cursor.word("element")?.to_string();
                let mut terms = Vec::new();
                for tok in cursor.rest() {
                    let (coef, index) = tok.split_once(':').ok_or_else(|| ProjectError::Parse {
                        line: line_no,
                        what: format!("expected <coef>:<index>, found '{tok}'"),
                    })?;
                    terms.push(TermDef {
                        coef: parse_number(coef, "coefficient", line_no)?,
                        index: index.parse().map_err(|_| ProjectError::Parse {
                            line: line_no,
                            what: format!("invalid unknown index '{index}'"),
                        })?,
                    });
                }
                if terms.is_empty() {
                    return Err(cursor.error(&format!("unknown for {element} has no terms")));
                }
                def.unknowns.push(UnknownDef { element, terms });
                continue;
            }
            "guess" => {
                let values = cursor
                    .rest()
                    .map(|tok| parse_number(tok, "guess", line_no))
                    .collect::<ProjectResult<Vec<Real>>>()?;
                def.guess = Some(values);
                continue;
            }
            "label" => {
                let index = cursor.word("label index")?;
                let index = index.parse().map_err(|_| ProjectError::Parse {
                    line: line_no,
                    what: format!("invalid label index '{index}'"),
                })?;
                let text: Vec<&str> = cursor.rest().collect();
                if text.is_empty() {
                    return Err(cursor.error("missing label text"));
                }
                def.labels.push(LabelDef {
                    index,
                    text: text.join(" "),
                });
                continue;
            }
            other => {
                return Err(cursor.error(&format!("unknown keyword '{other}'")));
            }
        }

        if let Some(extra) = cursor.next_token() {
            return Err(cursor.error(&format!("unexpected '{extra}'")));
        }
    }

    def.kind = kind.unwrap_or_else(|| {
        if def
            .elements
            .iter()
            .any(|e| e.kind.network_kind() == NetworkKind::Hydraulic)
        {
            NetworkKind::Hydraulic
        } else {
            NetworkKind::Circuit
        }
    });

    Ok(def)
}

fn parse_number(tok: &str, what: &str, line: usize) -> ProjectResult<Real> {
    tok.parse::<Real>().map_err(|_| ProjectError::Parse {
        line,
        what: format!("invalid {what} '{tok}'"),
    })
}

/// Whitespace tokens of one line.
struct Cursor<'a> {
    tokens: std::str::SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str, line_no: usize) -> Self {
        Self {
            tokens: line.split_whitespace(),
            line: line_no,
        }
    }

    fn error(&self, what: &str) -> ProjectError {
        ProjectError::Parse {
            line: self.line,
            what: what.to_string(),
        }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        self.tokens.next()
    }

    fn rest(&mut self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.by_ref()
    }

    fn word(&mut self, what: &str) -> ProjectResult<&'a str> {
        self.tokens
            .next()
            .ok_or_else(|| self.error(&format!("missing {what}")))
    }

    fn optional_word(&mut self) -> Option<String> {
        self.tokens.next().map(str::to_string)
    }

    fn number(&mut self, what: &str) -> ProjectResult<Real> {
        let tok = self.word(what)?;
        parse_number(tok, what, self.line)
    }

    fn endpoints(&mut self) -> ProjectResult<(String, String)> {
        let from = self.word("start node")?.to_string();
        let to = self.word("end node")?.to_string();
        Ok((from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CIRCUIT: &str = "
# two loops sharing the chord ac
name  Two loop circuit
source   a b 28
resistor b c 4
resistor c d 2
resistor d a 2
resistor a c 12
loop L1 ab bc ac
loop L2 ac cd da
label 0 I1
";

    #[test]
    fn parses_circuit() {
        let def = parse(CIRCUIT).unwrap();
        assert_eq!(def.name, "Two loop circuit");
        assert_eq!(def.kind, NetworkKind::Circuit);
        assert_eq!(def.elements.len(), 5);
        assert_eq!(def.elements[0].kind, ElementKind::Source { volts: 28.0 });
        assert_eq!(def.elements[4].label(), "ac");
        assert_eq!(def.loops[1].elements, vec!["ac", "cd", "da"]);
        assert_eq!(def.labels[0].text, "I1");
    }

    #[test]
    fn infers_hydraulic_kind() {
        let def = parse(
            "pipe a b 250 300 0.00025\n\
             pipe b a 100 200 0.00025 bypass\n\
             node a -10 reference\n\
             node b 10\n\
             loop A a-b bypass\n\
             guess 10 0",
        )
        .unwrap();
        assert_eq!(def.kind, NetworkKind::Hydraulic);
        assert_eq!(def.elements[1].label(), "bypass");
        assert_eq!(def.nodes[0].demand, -10.0);
        assert!(def.nodes[0].reference);
        assert!(!def.nodes[1].reference);
        assert_eq!(def.guess, Some(vec![10.0, 0.0]));
    }

    #[test]
    fn parses_unknown_terms() {
        let def = parse("resistor a b 1\nresistor b a 2\nunknown ba 1:0 -1:1").unwrap();
        assert_eq!(def.unknowns[0].element, "ba");
        assert_eq!(
            def.unknowns[0].terms,
            vec![
                TermDef {
                    index: 0,
                    coef: 1.0
                },
                TermDef {
                    index: 1,
                    coef: -1.0
                },
            ]
        );
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse("resistor a b 1\nresistor b c ten").unwrap_err();
        match err {
            ProjectError::Parse { line, what } => {
                assert_eq!(line, 2);
                assert!(what.contains("ten"));
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(matches!(
            parse("capacitor a b 1"),
            Err(ProjectError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse("resistor a b 1 r1 extra"),
            Err(ProjectError::Parse { .. })
        ));
        assert!(matches!(
            parse("unknown ab 1-0"),
            Err(ProjectError::Parse { .. })
        ));
        assert!(matches!(
            parse("unknowns two"),
            Err(ProjectError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn node_takes_one_demand() {
        let def = parse("pipe a b 1 100 0
node a reference -5").unwrap();
        assert_eq!(def.nodes[0].demand, -5.0);
        assert!(def.nodes[0].reference);

        match parse("pipe a b 1 100 0
node a -5 -7") {
            Err(ProjectError::Parse { line, what }) => {
                assert_eq!(line, 2);
                assert!(what.contains("-7"), "{what}");
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn parses_unknown_count() {
        let def = parse("source a b 1
resistor b a 1
unknowns 1
unknown ab 1:0
unknown ba 1:0")
            .unwrap();
        assert_eq!(def.unknown_count, Some(1));
        assert_eq!(def.num_unknowns(), 1);
        assert_eq!(def.unknowns.len(), 2);
    }
}
