//! Builders for column-exact PDB lines used by unit tests.

/// Build a `HELIX` record. `length: None` leaves the length columns blank.
#[allow(clippy::too_many_arguments)]
pub fn helix_line(
    serial: u32,
    start_chain: char,
    start: i32,
    start_icode: char,
    end_chain: char,
    end: i32,
    end_icode: char,
    length: Option<u32>,
) -> String {
    let length = length.map(|n| n.to_string()).unwrap_or_default();
    format!(
        "HELIX  {serial:>3} {serial:>3} ALA {start_chain}{start:>5}{start_icode} ALA {end_chain}{end:>5}{end_icode}{class:>2}{comment:30} {length:>5}",
        class = 1,
        comment = "",
    )
}

/// Build an `ATOM` record with fixed coordinates.
pub fn atom_line(serial: u32, name: &str, chain: char, seq: i32, icode: char) -> String {
    atom_line_alt(serial, name, ' ', "ALA", chain, seq, icode)
}

/// Build an `ATOM` record with an explicit alternate location and residue.
pub fn atom_line_alt(
    serial: u32,
    name: &str,
    alt_loc: char,
    residue: &str,
    chain: char,
    seq: i32,
    icode: char,
) -> String {
    format!(
        "ATOM  {serial:>5} {name:<4}{alt_loc}{residue:>3} {chain}{seq:>4}{icode}   {x:>8.3}{y:>8.3}{z:>8.3}  1.00  0.00           C",
        x = 11.104,
        y = 6.134,
        z = -6.504,
    )
}

/// Build a file from a list of records, newline-terminated.
pub fn pdb_file(lines: &[String]) -> String {
    let mut content = lines.join("\n");
    content.push('\n');
    content
}
