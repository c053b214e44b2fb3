use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use parish_access::access::{evaluate, resolve, AccessView, AuthorizationCheck, Capability, Requirement, ResolvedIdentity, Role};

fn identities() -> Vec<(&'static str, ResolvedIdentity)> {
    vec![
        ("anonymous", ResolvedIdentity::anonymous()),
        ("clerk", [Role::Clerk].into_iter().collect()),
        ("all_roles", Role::ALL.into_iter().collect()),
        ("super_admin", ResolvedIdentity::super_admin()),
    ]
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    for (name, id) in identities() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &id, |b, id| {
            b.iter(|| criterion::black_box(resolve(id)));
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let check = AuthorizationCheck::new()
        .require_all([Capability::ViewMembers, Capability::EditCore])
        .require_none([Capability::ManageUsers]);
    let mixed: AuthorizationCheck<Requirement> = AuthorizationCheck::new()
        .require_all([Requirement::Role(Role::Registrar), Requirement::Capability(Capability::ImportData)]);
    for (name, id) in identities() {
        let map = resolve(&id);
        group.bench_with_input(BenchmarkId::new("capabilities", name), &map, |b, map| {
            b.iter(|| criterion::black_box(evaluate(&check, map)));
        });
        let view = AccessView::new(id);
        group.bench_with_input(BenchmarkId::new("mixed", name), &view, |b, view| {
            b.iter(|| criterion::black_box(view.is_authorized(&mixed)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve, bench_evaluate);
criterion_main!(benches);
