//! The built-in command set.
//!
//! Every builtin carries an Arabic alias alongside the conventional short
//! one, and publishes its parameter table as a static descriptor for the
//! binder to walk.

use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::cmdlet::{
    Cmdlet, CmdletRegistry, CmdletSpec, ParameterSpec, PipelineBinding, ValueType,
};
use crate::error::ExecError;
use crate::object::Object;
use crate::pipeline::{BoundParameters, StageContext, StageFailure, StageResult};
use crate::session::SessionUpdate;

pub(crate) fn register_all(registry: &mut CmdletRegistry) {
    registry.register(&WRITE_OUTPUT, || Box::<WriteOutput>::default());
    registry.register(&GET_COMMAND, || Box::<GetCommand>::default());
    registry.register(&GET_VARIABLE, || Box::<GetVariable>::default());
    registry.register(&SET_VARIABLE, || Box::<SetVariable>::default());
    registry.register(&GET_LOCATION, || Box::<GetLocation>::default());
    registry.register(&SET_LOCATION, || Box::<SetLocation>::default());
    registry.register(&GET_CONTENT, || Box::<GetContent>::default());
    registry.register(&MEASURE_OBJECT, || Box::<MeasureObject>::default());
    registry.register(&WRITE_ERROR, || Box::<WriteError>::default());
}

// ---------------------------------------------------------------------------
// write-output

static WRITE_OUTPUT_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "InputObject",
    aliases: &["المدخل"],
    position: Some(0),
    mandatory: false,
    pipeline: PipelineBinding::ByValue,
    value_type: ValueType::StringArray,
}];

static WRITE_OUTPUT: CmdletSpec = CmdletSpec {
    name: "write-output",
    aliases: &["echo", "اكتب"],
    summary: "Write arguments and pipeline input to the output stream",
    parameters: WRITE_OUTPUT_PARAMS,
};

#[derive(Default)]
struct WriteOutput {
    values: Vec<String>,
}

impl Cmdlet for WriteOutput {
    fn bind(&mut self, parameters: BoundParameters) -> Result<(), ExecError> {
        self.values = parameters
            .get_list("InputObject")
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        Ok(())
    }

    fn begin_processing(&mut self, ctx: &mut StageContext<'_>) -> StageResult {
        for value in &self.values {
            ctx.write_output(Object::text(value.clone()))?;
        }
        Ok(())
    }

    fn process_record(
        &mut self,
        input: Option<Object>,
        ctx: &mut StageContext<'_>,
    ) -> StageResult {
        match input {
            Some(object) => ctx.write_output(object),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// get-command

static GET_COMMAND_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "Name",
    aliases: &["اسم"],
    position: Some(0),
    mandatory: false,
    pipeline: PipelineBinding::None,
    value_type: ValueType::String,
}];

static GET_COMMAND: CmdletSpec = CmdletSpec {
    name: "get-command",
    aliases: &["الأوامر"],
    summary: "List registered commands",
    parameters: GET_COMMAND_PARAMS,
};

#[derive(Default)]
struct GetCommand {
    name: Option<String>,
}

impl Cmdlet for GetCommand {
    fn bind(&mut self, parameters: BoundParameters) -> Result<(), ExecError> {
        self.name = parameters.get_text("Name").map(str::to_string);
        Ok(())
    }

    fn begin_processing(&mut self, ctx: &mut StageContext<'_>) -> StageResult {
        for registration in ctx.registry().iter() {
            let spec = registration.spec;
            if let Some(filter) = &self.name {
                let matches =
                    spec.name == filter || spec.aliases.contains(&filter.as_str());
                if !matches {
                    continue;
                }
            }
            ctx.write_output(Object::record([
                ("name", Object::text(spec.name)),
                ("aliases", Object::text(spec.aliases.join(", "))),
                ("summary", Object::text(spec.summary)),
            ]))?;
        }
        Ok(())
    }

    fn process_record(
        &mut self,
        _input: Option<Object>,
        _ctx: &mut StageContext<'_>,
    ) -> StageResult {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// get-variable / set-variable

static GET_VARIABLE_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "Name",
    aliases: &["اسم"],
    position: Some(0),
    mandatory: true,
    pipeline: PipelineBinding::None,
    value_type: ValueType::String,
}];

static GET_VARIABLE: CmdletSpec = CmdletSpec {
    name: "get-variable",
    aliases: &["متغير"],
    summary: "Read a session variable",
    parameters: GET_VARIABLE_PARAMS,
};

#[derive(Default)]
struct GetVariable {
    name: String,
}

impl Cmdlet for GetVariable {
    fn bind(&mut self, parameters: BoundParameters) -> Result<(), ExecError> {
        self.name = parameters.get_text("Name").unwrap_or_default().to_string();
        Ok(())
    }

    fn begin_processing(&mut self, ctx: &mut StageContext<'_>) -> StageResult {
        let value = ctx.session().expand(&self.name);
        ctx.write_output(Object::text(value))
    }

    fn process_record(
        &mut self,
        _input: Option<Object>,
        _ctx: &mut StageContext<'_>,
    ) -> StageResult {
        Ok(())
    }
}

static SET_VARIABLE_PARAMS: &[ParameterSpec] = &[
    ParameterSpec {
        name: "Name",
        aliases: &["اسم"],
        position: Some(0),
        mandatory: true,
        pipeline: PipelineBinding::None,
        value_type: ValueType::String,
    },
    ParameterSpec {
        name: "Value",
        aliases: &["قيمة"],
        position: Some(1),
        mandatory: true,
        pipeline: PipelineBinding::None,
        value_type: ValueType::String,
    },
];

static SET_VARIABLE: CmdletSpec = CmdletSpec {
    name: "set-variable",
    aliases: &["عين"],
    summary: "Set a session variable",
    parameters: SET_VARIABLE_PARAMS,
};

#[derive(Default)]
struct SetVariable {
    name: String,
    value: String,
}

impl Cmdlet for SetVariable {
    fn bind(&mut self, parameters: BoundParameters) -> Result<(), ExecError> {
        self.name = parameters.get_text("Name").unwrap_or_default().to_string();
        self.value = parameters.get_text("Value").unwrap_or_default().to_string();
        Ok(())
    }

    fn begin_processing(&mut self, ctx: &mut StageContext<'_>) -> StageResult {
        ctx.request_update(SessionUpdate::SetVariable(
            self.name.clone(),
            self.value.clone(),
        ));
        Ok(())
    }

    fn process_record(
        &mut self,
        _input: Option<Object>,
        _ctx: &mut StageContext<'_>,
    ) -> StageResult {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// get-location / set-location

static GET_LOCATION: CmdletSpec = CmdletSpec {
    name: "get-location",
    aliases: &["pwd", "أين"],
    summary: "Print the session working directory",
    parameters: &[],
};

#[derive(Default)]
struct GetLocation;

impl Cmdlet for GetLocation {
    fn bind(&mut self, _parameters: BoundParameters) -> Result<(), ExecError> {
        Ok(())
    }

    fn begin_processing(&mut self, ctx: &mut StageContext<'_>) -> StageResult {
        let dir = ctx.session().working_dir().display().to_string();
        ctx.write_output(Object::text(dir))
    }

    fn process_record(
        &mut self,
        _input: Option<Object>,
        _ctx: &mut StageContext<'_>,
    ) -> StageResult {
        Ok(())
    }
}

static SET_LOCATION_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "Path",
    aliases: &["مسار"],
    position: Some(0),
    mandatory: true,
    pipeline: PipelineBinding::None,
    value_type: ValueType::String,
}];

static SET_LOCATION: CmdletSpec = CmdletSpec {
    name: "set-location",
    aliases: &["cd", "اذهب"],
    summary: "Change the session working directory",
    parameters: SET_LOCATION_PARAMS,
};

#[derive(Default)]
struct SetLocation {
    path: String,
}

impl Cmdlet for SetLocation {
    fn bind(&mut self, parameters: BoundParameters) -> Result<(), ExecError> {
        self.path = parameters.get_text("Path").unwrap_or_default().to_string();
        Ok(())
    }

    fn begin_processing(&mut self, ctx: &mut StageContext<'_>) -> StageResult {
        let resolved = ctx.session().resolve_path(&self.path);
        if !resolved.is_dir() {
            return Err(StageFailure::message(format!(
                "no such directory: {}",
                self.path
            )));
        }
        ctx.request_update(SessionUpdate::SetWorkingDir(resolved));
        Ok(())
    }

    fn process_record(
        &mut self,
        _input: Option<Object>,
        _ctx: &mut StageContext<'_>,
    ) -> StageResult {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// get-content

static GET_CONTENT_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "Path",
    aliases: &["مسار"],
    position: Some(0),
    mandatory: true,
    pipeline: PipelineBinding::None,
    value_type: ValueType::String,
}];

static GET_CONTENT: CmdletSpec = CmdletSpec {
    name: "get-content",
    aliases: &["cat", "اقرأ"],
    summary: "Read a file as a stream of lines",
    parameters: GET_CONTENT_PARAMS,
};

#[derive(Default)]
struct GetContent {
    path: String,
}

impl Cmdlet for GetContent {
    fn bind(&mut self, parameters: BoundParameters) -> Result<(), ExecError> {
        self.path = parameters.get_text("Path").unwrap_or_default().to_string();
        Ok(())
    }

    fn begin_processing(&mut self, ctx: &mut StageContext<'_>) -> StageResult {
        let resolved = ctx.session().resolve_path(&self.path);
        let file = File::open(resolved)?;
        for line in BufReader::new(file).lines() {
            ctx.write_output(Object::text(line?))?;
        }
        Ok(())
    }

    fn process_record(
        &mut self,
        _input: Option<Object>,
        _ctx: &mut StageContext<'_>,
    ) -> StageResult {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// write-error

static WRITE_ERROR_PARAMS: &[ParameterSpec] = &[ParameterSpec {
    name: "Message",
    aliases: &["رسالة"],
    position: Some(0),
    mandatory: true,
    pipeline: PipelineBinding::None,
    value_type: ValueType::String,
}];

static WRITE_ERROR: CmdletSpec = CmdletSpec {
    name: "write-error",
    aliases: &["خطأ"],
    summary: "Write a non-terminating error record",
    parameters: WRITE_ERROR_PARAMS,
};

#[derive(Default)]
struct WriteError {
    message: String,
}

impl Cmdlet for WriteError {
    fn bind(&mut self, parameters: BoundParameters) -> Result<(), ExecError> {
        self.message = parameters
            .get_text("Message")
            .unwrap_or_default()
            .to_string();
        Ok(())
    }

    fn begin_processing(&mut self, ctx: &mut StageContext<'_>) -> StageResult {
        ctx.write_error(&self.message);
        Ok(())
    }

    fn process_record(
        &mut self,
        _input: Option<Object>,
        _ctx: &mut StageContext<'_>,
    ) -> StageResult {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// measure-object

static MEASURE_OBJECT: CmdletSpec = CmdletSpec {
    name: "measure-object",
    aliases: &["قس"],
    summary: "Count the objects flowing through the pipeline",
    parameters: &[],
};

#[derive(Default)]
struct MeasureObject {
    count: u64,
}

impl Cmdlet for MeasureObject {
    fn bind(&mut self, _parameters: BoundParameters) -> Result<(), ExecError> {
        Ok(())
    }

    fn process_record(
        &mut self,
        input: Option<Object>,
        _ctx: &mut StageContext<'_>,
    ) -> StageResult {
        if input.is_some() {
            self.count += 1;
        }
        Ok(())
    }

    fn end_processing(&mut self, ctx: &mut StageContext<'_>) -> StageResult {
        ctx.write_output(Object::record([(
            "count",
            Object::text(self.count.to_string()),
        )]))
    }
}
