// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use std::fmt::Display;

use model::{Chain, Classifier};

const LINE_WIDTH: usize = 100;

struct Heading(&'static str);

impl Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = LINE_WIDTH.saturating_sub(self.0.len() + 2) / 2;
        write!(f, " {0:─<width$}", "─", width = len)?;
        write!(f, " {} ", self.0)?;
        writeln!(f, " {0:─<width$}", "─", width = len)
    }
}

macro_rules! CHAIN_TBL_FMT {
    () => {
        " {:<36} {:<16} {:<15} {:<5} {:<24} {}"
    };
}

macro_rules! CLASSIFIER_TBL_FMT {
    () => {
        " {:<36} {:<16} {:<15} {:<24} {}"
    };
}

fn or_dashes(value: Option<&str>) -> &str {
    value.unwrap_or("--")
}

/// Chains, one per line
pub struct ChainTable<'a>(pub &'a [Chain]);

impl Display for ChainTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Heading("Chains").fmt(f)?;
        writeln!(
            f,
            "{}",
            format_args!(CHAIN_TBL_FMT!(), "id", "name", "status", "sym", "instance", "vnfs")
        )?;
        for chain in self.0 {
            writeln!(
                f,
                "{}",
                format_args!(
                    CHAIN_TBL_FMT!(),
                    chain.id.to_string(),
                    chain.name,
                    chain.status.to_string(),
                    if chain.symmetrical { "yes" } else { "no" },
                    or_dashes(chain.instance_id.as_deref()),
                    chain.chain.join(" > ")
                )
            )?;
        }
        Ok(())
    }
}

/// One chain, with its orphans
pub struct ChainDetail<'a>(pub &'a Chain);

impl Display for ChainDetail<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let chain = self.0;
        Heading("Chain").fmt(f)?;
        writeln!(f, " id: {}", chain.id)?;
        writeln!(f, " name: {}", chain.name)?;
        writeln!(f, " description: {}", or_dashes(chain.description.as_deref()))?;
        writeln!(f, " vnfs: {}", chain.chain.join(" > "))?;
        writeln!(f, " symmetrical: {}", chain.symmetrical)?;
        writeln!(f, " driver: {}", chain.infra_driver)?;
        writeln!(f, " status: {}", chain.status)?;
        writeln!(f, " instance: {}", or_dashes(chain.instance_id.as_deref()))?;
        for (key, value) in &chain.attributes {
            writeln!(f, " attribute {key}: {value}")?;
        }
        if !chain.orphans.is_empty() {
            writeln!(f, " left behind on the controller:")?;
            for orphan in &chain.orphans {
                writeln!(f, "   {orphan}")?;
            }
        }
        Ok(())
    }
}

/// Classifiers, one per line
pub struct ClassifierTable<'a>(pub &'a [Classifier]);

impl Display for ClassifierTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Heading("Classifiers").fmt(f)?;
        writeln!(
            f,
            "{}",
            format_args!(CLASSIFIER_TBL_FMT!(), "id", "name", "status", "instance", "chain")
        )?;
        for classifier in self.0 {
            writeln!(
                f,
                "{}",
                format_args!(
                    CLASSIFIER_TBL_FMT!(),
                    classifier.id.to_string(),
                    classifier.name,
                    classifier.status.to_string(),
                    or_dashes(classifier.instance_id.as_deref()),
                    classifier.chain
                )
            )?;
        }
        Ok(())
    }
}

/// One classifier, with its match criteria
pub struct ClassifierDetail<'a>(pub &'a Classifier);

impl Display for ClassifierDetail<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let classifier = self.0;
        let criteria = &classifier.acl_match_criteria;
        Heading("Classifier").fmt(f)?;
        writeln!(f, " id: {}", classifier.id)?;
        writeln!(f, " name: {}", classifier.name)?;
        writeln!(
            f,
            " description: {}",
            or_dashes(classifier.description.as_deref())
        )?;
        writeln!(f, " chain: {}", classifier.chain)?;
        writeln!(f, " driver: {}", classifier.infra_driver)?;
        writeln!(f, " status: {}", classifier.status)?;
        writeln!(
            f,
            " instance: {}",
            or_dashes(classifier.instance_id.as_deref())
        )?;
        let fields = [
            ("source mac", criteria.source_mac.clone()),
            ("dest mac", criteria.dest_mac.clone()),
            ("ethertype", criteria.ethertype.clone()),
            ("source prefix", criteria.source_ip_prefix.clone()),
            ("dest prefix", criteria.dest_ip_prefix.clone()),
            ("source port", criteria.source_port.map(|p| p.to_string())),
            ("dest port", criteria.dest_port.map(|p| p.to_string())),
            ("protocol", criteria.protocol.map(|p| p.to_string())),
        ];
        for (what, value) in fields {
            if let Some(value) = value {
                writeln!(f, " match {what}: {value}")?;
            }
        }
        Ok(())
    }
}
