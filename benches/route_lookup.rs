use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use routeforge::{CompiledRoute, HttpMethod, RouteTable};

fn zoo_routes() -> Vec<CompiledRoute> {
    let route = |method, path: &str, name: &str| {
        let vars: Vec<String> = path
            .split('/')
            .filter_map(|s| s.strip_prefix('{')?.strip_suffix('}'))
            .map(|s| s.split(':').next().unwrap_or(s).to_string())
            .collect();
        CompiledRoute::function(method, path, name, vars)
    };
    vec![
        route(HttpMethod::Get, "", "root_handler"),
        route(HttpMethod::Get, "/zoo/animals", "get_animals"),
        route(HttpMethod::Post, "/zoo/animals", "create_animal"),
        route(HttpMethod::Get, "/zoo/animals/{id:\\d+}", "get_animal"),
        route(HttpMethod::Put, "/zoo/animals/{id}", "update_animal"),
        route(HttpMethod::Patch, "/zoo/animals/{id}", "patch_animal"),
        route(HttpMethod::Delete, "/zoo/animals/{id}", "delete_animal"),
        route(HttpMethod::Get, "/zoo/animals/{id}/toys/{toy_id}", "animal_toy"),
        route(
            HttpMethod::Get,
            "/zoo/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}",
            "habitat_section",
        ),
        route(
            HttpMethod::Post,
            "/inventory/{warehouse_id}/feeds/{feed_id}/items/{item_id}/batches/{batch_id}",
            "post_item_batch",
        ),
        route(
            HttpMethod::Get,
            "/complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}",
            "complex_many_params",
        ),
        route(HttpMethod::Head, "/zoo/health", "health_check"),
        route(HttpMethod::Options, "/zoo/health", "supported_ops"),
    ]
}

fn bench_route_lookup(c: &mut Criterion) {
    let table = RouteTable::new(zoo_routes()).unwrap();
    let test_paths = [
        (Method::GET, "/zoo/animals/123"),
        (Method::GET, "/zoo/animals/123/toys/456"),
        (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
        (Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
        (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
    ];
    c.bench_function("route_match", |b| {
        b.iter(|| {
            for (method, path) in &test_paths {
                black_box(table.lookup(method, path));
            }
        })
    });
    c.bench_function("route_miss", |b| {
        b.iter(|| {
            black_box(table.lookup(&Method::GET, "/zoo/unknown/path"));
            black_box(table.lookup(&Method::TRACE, "/zoo/health"));
        })
    });
}

fn bench_table_load(c: &mut Criterion) {
    let text = routeforge::compiler::render(&zoo_routes()).unwrap();
    c.bench_function("table_load", |b| {
        b.iter(|| {
            let routes = routeforge::compiler::parse(black_box(&text)).unwrap();
            black_box(RouteTable::new(routes).unwrap())
        })
    });
}

criterion_group!(benches, bench_route_lookup, bench_table_load);
criterion_main!(benches);
