use crate::access::{rules, CapabilityMap, Grant, Role};

// Render rows as an ASCII table. Column widths fit the widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(widths.len()) {
            if cell.len() > widths[i] { widths[i] = cell.len(); }
        }
    }
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let sep = build_separator(&widths);
    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(sep.clone());
    out.push(build_row(&header, &widths));
    out.push(sep.clone());
    for r in rows {
        out.push(build_row(r, &widths));
    }
    out.push(sep);
    out.join("\n")
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        s.push(' ');
        s.push_str(&cell);
        s.push_str(&" ".repeat(w.saturating_sub(cell.len())));
        s.push_str(" |");
    }
    s
}

pub fn capability_table(map: &CapabilityMap) -> String {
    let rows: Vec<Vec<String>> = map
        .iter()
        .map(|(cap, v)| vec![cap.name().to_string(), if v { "yes".into() } else { "no".into() }])
        .collect();
    let mut out = render_table(&["capability", "granted"], &rows);
    out.push_str(&format!("\n{} of {} granted", map.count_granted(), rows.len()));
    out
}

pub fn roles_table() -> String {
    let rows: Vec<Vec<String>> = Role::ALL
        .into_iter()
        .map(|role| {
            let granted: Vec<&str> = rules::capabilities_for(role).iter().filter(|(_, v)| *v).map(|(c, _)| c.name()).collect();
            vec![role.label().to_string(), granted.join(", ")]
        })
        .collect();
    render_table(&["role", "grants"], &rows)
}

pub fn describe_grant(grant: &Grant) -> String {
    match grant {
        Grant::SuperAdmin => "granted (super admin)".to_string(),
        Grant::Roles(roles) => {
            let names: Vec<&str> = roles.iter().map(|r| r.label()).collect();
            format!("granted by {}", names.join(", "))
        }
        Grant::Denied => "denied".to_string(),
    }
}
