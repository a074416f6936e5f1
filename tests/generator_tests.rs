use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use shimgen::{
    FsHeaderSource, FsSink, GenerateError, Generator, HeaderFile, MemoryHeaderSource, MemorySink,
};
use shimgen_ffi::BindingConfig;

const FOO_H: &str = "\
#pragma once
#include <string>

class Foo {
public:
    // [JS_BINDING_BEGIN]
    void setX(float x);
    // [JS_BINDING_END]
private:
    float m_x = 0.0f;
};
";

const TEXTURE_H: &str = "\
class Texture {
public:
    // [JS_BINDING_BEGIN]
    static int create(int w, int h);
    // [JS_BINDING_END]
};
";

const NODE_H: &str = "\
class Node {
public:
    // [JS_BINDING_BEGIN]
    void setPos(Vector3 v);
    // [JS_BINDING_END]
};
";

fn config_in(dir: &Path, namespace: &str) -> BindingConfig {
    let mut config = BindingConfig::new("game_api");
    config.namespace = namespace.to_string();
    config.script_output = dir.to_path_buf();
    config.native_output_dir = dir.join("js_binding");
    config
}

fn generate(config: &BindingConfig, headers: &[(&str, &str)]) -> Result<shimgen::GeneratedArtifacts, GenerateError> {
    let files: Vec<HeaderFile> = headers
        .iter()
        .map(|(path, contents)| HeaderFile::new(*path, *contents))
        .collect();
    Generator::new(config).generate(&files)
}

#[test]
fn instance_method_pairs_script_entry_with_native_export() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path(), "game");
    let artifacts = generate(&config, &[("foo.h", FOO_H)])?;

    assert_eq!(
        artifacts.script,
        "let game = {\n\
         Foo_setX: function(ptr, x) {\n\
         \x20   let f = ffi(\"void Foo_setX(void*, float)\");\n\
         \x20   return f(ptr, x);\n\
         },\n\
         };\n"
    );
    assert!(
        artifacts
            .native
            .contains("void Foo_setX(Foo* ptr, float x) {\n    ptr->setX(x);\n}\n")
    );
    assert!(
        artifacts
            .native
            .contains("apiMap[std::hash<std::string>()(\"Foo_setX\")] = (void*)Foo_setX;")
    );
    assert!(artifacts.native.contains("void Register_GAME_API() {"));
    Ok(())
}

#[test]
fn static_method_has_no_receiver() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path(), "game");
    let artifacts = generate(&config, &[("texture.h", TEXTURE_H)])?;

    let decl = &artifacts.declarations[0];
    assert_eq!(decl.function_name, "create");
    assert!(decl.receiver().is_none());
    assert!(artifacts.script.contains("let f = ffi(\"int create(int, int)\");"));
    assert!(
        artifacts
            .native
            .contains("int create(int w, int h) {\n    return Texture::create(w, h);\n}\n")
    );
    Ok(())
}

#[test]
fn vector_parameter_is_flattened_and_rebuilt() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path(), "game");
    let artifacts = generate(&config, &[("node.h", NODE_H)])?;

    let names: Vec<_> = artifacts.declarations[0]
        .parameters
        .iter()
        .map(|p| (p.ty.as_str(), p.name.as_str()))
        .collect();
    assert_eq!(
        names,
        [
            ("Node*", "ptr"),
            ("float", "vec_x"),
            ("float", "vec_y"),
            ("float", "vec_z")
        ]
    );
    assert!(
        artifacts
            .script
            .contains("ffi(\"void Node_setPos(void*, float, float, float)\")")
    );
    assert!(artifacts.native.contains(
        "void Node_setPos(Node* ptr, float vec_x, float vec_y, float vec_z) {\n    \
         ptr->setPos(Vector3f(vec_x, vec_y, vec_z));\n}\n"
    ));
    Ok(())
}

#[test]
fn malformed_line_aborts_before_anything_is_written() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = fs::canonicalize(dir.path())?;
    fs::create_dir_all(root.join("port"))?;
    fs::write(root.join("port/foo.h"), FOO_H)?;
    fs::write(
        root.join("port/zz_broken.h"),
        "class Broken {\n// [JS_BINDING_BEGIN]\nint m_count;\n// [JS_BINDING_END]\n};\n",
    )?;

    let mut config = config_in(&root, "game");
    config.header_root = root.join("port");
    let generator = Generator::new(&config);
    let source = FsHeaderSource::new(&config.header_root, Vec::new());

    let err = generator
        .run(&source, &mut FsSink)
        .expect_err("malformed header must abort");
    match err.downcast_ref::<GenerateError>() {
        Some(GenerateError::Scan(scan)) => {
            assert_eq!(scan.header(), root.join("port/zz_broken.h"));
            assert!(scan.to_string().contains("zz_broken.h:3"));
        }
        other => panic!("expected scan error, got {other:?}"),
    }
    assert!(!config.script_output_path().exists());
    assert!(!config.native_output_path().exists());
    Ok(())
}

#[test]
fn missing_script_directory_is_rejected_up_front() {
    let mut config = BindingConfig::new("game_api");
    config.script_output = PathBuf::from("/definitely/not/here");
    let err = Generator::new(&config)
        .check_preconditions()
        .expect_err("output root must exist");
    assert!(matches!(err, GenerateError::MissingOutputRoot(_)));
    assert!(err.to_string().contains("binding export aborted"));
}

#[test]
fn writes_both_artifacts_with_relative_includes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = fs::canonicalize(dir.path())?;
    fs::create_dir_all(root.join("port/render"))?;
    fs::create_dir_all(root.join("port/dist"))?;
    fs::write(root.join("port/foo.h"), FOO_H)?;
    fs::write(root.join("port/render/texture.h"), TEXTURE_H)?;
    fs::write(root.join("port/dist/foo_copy.h"), FOO_H)?;
    fs::write(root.join("port/plain.h"), "class Plain {\n void hidden();\n};\n")?;

    let mut config = config_in(&root, "game");
    config.header_root = root.join("port");
    config.excludes = vec![root.join("port/dist")];

    let generator = Generator::new(&config);
    let source = FsHeaderSource::new(&config.header_root, config.excludes.clone());
    let artifacts = generator.run(&source, &mut FsSink)?;

    assert!(artifacts.collisions.is_empty());
    let native = fs::read_to_string(root.join("js_binding/game_api_export.cpp"))?;
    let script = fs::read_to_string(root.join("game_api.js"))?;
    assert_eq!(native, artifacts.native);
    assert_eq!(script, artifacts.script);

    let includes: Vec<_> = native
        .lines()
        .filter(|line| line.starts_with("#include"))
        .collect();
    assert_eq!(
        includes,
        [
            "#include <unordered_map>",
            "#include \"../port/foo.h\"",
            "#include \"../port/render/texture.h\"",
        ]
    );
    assert!(native.starts_with("// Generated by shimgen\n"));
    assert!(native.contains("extern std::unordered_map<uint32_t, void*>* g_APIMap;"));
    Ok(())
}

#[test]
fn regenerating_is_byte_identical() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path(), "game");
    let headers = [("foo.h", FOO_H), ("texture.h", TEXTURE_H), ("node.h", NODE_H)];

    let first = generate(&config, &headers)?;
    let second = generate(&config, &headers)?;
    assert_eq!(first.script, second.script);
    assert_eq!(first.native, second.native);

    let mut reversed = headers;
    reversed.reverse();
    let third = generate(&config, &reversed)?;
    let registry = |native: &str| -> Vec<String> {
        native
            .lines()
            .filter(|line| line.starts_with("#include") || line.contains("apiMap["))
            .map(ToString::to_string)
            .collect()
    };
    assert_eq!(registry(&first.native), registry(&third.native));
    Ok(())
}

#[test]
fn empty_namespace_emits_bare_entries() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path(), "");
    let artifacts = generate(&config, &[("foo.h", FOO_H)])?;

    assert!(!artifacts.script.contains("let game"));
    assert!(artifacts.script.starts_with("Foo_setX: function(ptr, x) {\n"));
    assert!(artifacts.script.ends_with("}\n"));
    assert!(!artifacts.script.contains("},"));
    Ok(())
}

#[test]
fn colliding_export_names_warn_or_fail_in_strict_mode() -> Result<()> {
    const SPRITE_H: &str = "\
class Sprite {
    // [JS_BINDING_BEGIN]
    static int create(int w, int h);
    // [JS_BINDING_END]
};
";
    let dir = tempfile::tempdir()?;
    let mut config = config_in(dir.path(), "game");
    let headers = [("sprite.h", SPRITE_H), ("texture.h", TEXTURE_H)];

    let lenient = generate(&config, &headers)?;
    assert_eq!(lenient.collisions.len(), 1);
    assert_eq!(lenient.collisions[0].name, "create");
    assert_eq!(
        lenient
            .native
            .matches("apiMap[std::hash<std::string>()(\"create\")]")
            .count(),
        1
    );

    config.strict = true;
    match generate(&config, &headers) {
        Err(GenerateError::DuplicateExport(collision)) => {
            assert_eq!(collision.first.header, PathBuf::from("sprite.h"));
            assert_eq!(collision.second.header, PathBuf::from("texture.h"));
        }
        other => panic!("expected duplicate export error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn memory_sink_receives_both_artifacts() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path(), "game");
    let source = MemoryHeaderSource::new().with_header("foo.h", FOO_H);
    let mut sink = MemorySink::new();

    let artifacts = Generator::new(&config).run(&source, &mut sink)?;
    assert_eq!(sink.len(), 2);
    assert_eq!(sink.get(&artifacts.script_path), Some(artifacts.script.as_str()));
    assert_eq!(sink.get(&artifacts.native_path), Some(artifacts.native.as_str()));
    Ok(())
}

#[test]
fn owning_pointers_and_strings_cross_both_boundaries() -> Result<()> {
    const SPINE_H: &str = "\
class SpineNode : public Node {
public:
    // [JS_BINDING_BEGIN]
    bool setSkin(const std::string& name);
    TexturePtr swapTexture(const TexturePtr& texture, Layer2D layer);
    void setColor(Vector2 uv, int tint = 0xFFFFFF);
    // [JS_BINDING_END]
};
";
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path(), "spine");
    let artifacts = generate(&config, &[("spine_node.h", SPINE_H)])?;

    let script = &artifacts.script;
    assert!(script.contains("ffi(\"bool SpineNode_setSkin(void*, char*)\")"));
    assert!(script.contains("ffi(\"void* SpineNode_swapTexture(void*, void*, int)\")"));
    assert!(script.contains("ffi(\"void SpineNode_setColor(void*, float, float, int)\")"));

    let native = &artifacts.native;
    assert!(native.contains(
        "bool SpineNode_setSkin(SpineNode* ptr, char* name) {\n    return ptr->setSkin(name);\n}\n"
    ));
    assert!(native.contains(
        "Texture* SpineNode_swapTexture(SpineNode* ptr, Texture* texture_sp, Layer2D layer) {\n    \
         return ptr->swapTexture(TexturePtr(texture_sp), layer);\n}\n"
    ));
    assert!(native.contains(
        "void SpineNode_setColor(SpineNode* ptr, float vec_x, float vec_y, int tint) {\n    \
         ptr->setColor(Vector2f(vec_x, vec_y), tint);\n}\n"
    ));
    assert!(!native.contains("const std::string&"));
    Ok(())
}

#[test]
fn free_functions_are_registered_without_a_wrapper() -> Result<()> {
    const UTIL_H: &str = "\
// [JS_BINDING_BEGIN]
void log(const std::string& msg);
int add(int a, int b);
// [JS_BINDING_END]
";
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path(), "util");
    let artifacts = generate(&config, &[("util.h", UTIL_H)])?;

    assert!(artifacts.script.contains("ffi(\"void log(char*)\")"));
    assert!(artifacts.script.contains("ffi(\"int add(int, int)\")"));
    let native = &artifacts.native;
    assert!(!native.contains("log(msg)"));
    assert!(!native.contains("add(a, b)"));
    assert!(native.contains("apiMap[std::hash<std::string>()(\"log\")] = (void*)log;"));
    assert!(native.contains("apiMap[std::hash<std::string>()(\"add\")] = (void*)add;"));
    Ok(())
}

#[test]
fn nameless_and_wrapped_parameters_stay_aligned() -> Result<()> {
    const ATLAS_H: &str = "\
class Atlas {
    // [JS_BINDING_BEGIN]
    void setName(const std::string&);
    void fill(const std::vector<TexturePtr>& pages, TexturePtr* slot);
    // [JS_BINDING_END]
};
";
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path(), "atlas");
    let artifacts = generate(&config, &[("atlas.h", ATLAS_H)])?;

    let script = &artifacts.script;
    assert!(script.contains("Atlas_setName: function(ptr, arg0) {"));
    assert!(script.contains("ffi(\"void Atlas_setName(void*, char*)\")"));
    assert!(script.contains("ffi(\"void Atlas_fill(void*, void*, void*)\")"));

    let native = &artifacts.native;
    assert!(native.contains(
        "void Atlas_setName(Atlas* ptr, char* arg0) {\n    ptr->setName(arg0);\n}\n"
    ));
    assert!(native.contains(
        "void Atlas_fill(Atlas* ptr, void* pages, void* slot) {\n    \
         ptr->fill(*static_cast<std::vector<TexturePtr>*>(pages), static_cast<TexturePtr*>(slot));\n}\n"
    ));
    Ok(())
}
